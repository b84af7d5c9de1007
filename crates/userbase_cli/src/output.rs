//! Result printing in text or JSON-lines form.

use anyhow::Result;
use std::io::Write;
use userbase_core::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    JsonLines,
}

/// Writes users and status messages to one sink.
///
/// Status messages are plain text in both formats.
pub struct Printer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn user(&mut self, user: &User) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{user}")?,
            OutputFormat::JsonLines => writeln!(self.out, "{}", serde_json::to_string(user)?)?,
        }
        Ok(())
    }

    pub fn message(&mut self, message: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", message.as_ref())?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputFormat, Printer};
    use userbase_core::User;

    fn user() -> User {
        User {
            id: 1,
            username: "bob".to_string(),
            email: "bob@mail.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        }
    }

    #[test]
    fn text_format_uses_display_form() {
        let mut printer = Printer::new(Vec::new(), OutputFormat::Text);
        printer.user(&user()).unwrap();

        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(text, "User(id=1, username=bob, email=bob@mail.com)\n");
    }

    #[test]
    fn json_format_writes_one_object_per_line_without_hash() {
        let mut printer = Printer::new(Vec::new(), OutputFormat::JsonLines);
        printer.user(&user()).unwrap();
        printer.message("done").unwrap();

        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            text,
            "{\"id\":1,\"username\":\"bob\",\"email\":\"bob@mail.com\"}\ndone\n"
        );
    }
}
