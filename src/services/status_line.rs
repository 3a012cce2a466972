use std::io::{self, Write};

/// Single-line console status that overwrites its previous message.
pub struct StatusLine<W: Write> {
    out: W,
    last_len: usize,
}

impl StatusLine<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W) -> Self {
        Self { out, last_len: 0 }
    }

    pub fn show(&mut self, msg: &str) -> io::Result<()> {
        write!(self.out, "{}\r", " ".repeat(self.last_len))?;
        write!(self.out, "{}\r", msg)?;
        self.out.flush()?;
        self.last_len = msg.chars().count();
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
