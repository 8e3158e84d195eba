//! Identifier case conversion shared by the context builder and the
//! template helpers.
//!
//! | Input             | camel          | pascal         | kebab            | snake            |
//! |-------------------|----------------|----------------|------------------|------------------|
//! | "my test project" | myTestProject  | MyTestProject  | my-test-project  | my_test_project  |
//! | "HTTPClientTests" | httpClientTests| HttpClientTests| http-client-tests| http_client_tests|

pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

pub fn to_camel_case(s: &str) -> String {
    let mut words = split_words(s).into_iter();
    match words.next() {
        Some(first) => {
            let rest: String = words.map(|w| capitalize(&w)).collect();
            first + &rest
        }
        None => String::new(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split on separators (`_`, `-`, `.`, `/`, whitespace), lower→upper
/// transitions (`myApp`) and acronym boundaries (`HTTPServer`). Words are
/// lowercased; characters that are neither alphanumeric nor separators are
/// dropped.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c == '/' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }
        if !c.is_alphanumeric() {
            continue;
        }

        if let Some(&next) = chars.peek() {
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
