//! Terminal collaborator consumed by the dispatcher.

use std::io;

/// Line-oriented terminal used for every prompt and message.
pub trait Terminal {
    /// Print `prompt`, then read one line without its trailing newline.
    fn prompt_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Like [`Terminal::prompt_line`] but the typed characters are not echoed.
    fn prompt_sensitive(&mut self, prompt: &str) -> io::Result<String>;

    /// Print one line of output.
    fn write_line(&mut self, text: &str);

    /// Clear the visible screen, best-effort.
    fn clear_screen(&mut self);
}
