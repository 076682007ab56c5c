//! Reserved keywords recognised at every prompt.

/// Keyword that short-circuits normal menu routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Quit the application.
    Exit,
    /// Forget the logged in user.
    Logout,
    /// Show the help text.
    Help,
    /// Abandon the current input flow.
    Cancel,
}

/// A line of user input after keyword recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// One of the reserved keywords, matched case-insensitively.
    Keyword(Keyword),
    /// Anything else, passed through untouched.
    Value(String),
}

/// Classify a raw line read from the terminal.
pub fn classify_input(raw: &str) -> Input {
    let keyword = match raw.to_lowercase().as_str() {
        "exit" => Keyword::Exit,
        "logout" => Keyword::Logout,
        "help" => Keyword::Help,
        "cancel" => Keyword::Cancel,
        _ => return Input::Value(raw.to_string()),
    };
    Input::Keyword(keyword)
}
