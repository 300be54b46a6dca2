//! Boxed table renderer for the terminal

use std::collections::BTreeMap;
use std::io::Write;

use super::{DisplayField, DisplaySurface};

const LABEL_WIDTH: usize = 16;
const VALUE_WIDTH: usize = 28;

/// Collects field writes and prints them as a table on flush
pub struct TerminalSurface<W: Write = std::io::Stdout> {
    out: W,
    title: String,
    fields: BTreeMap<DisplayField, String>,
}

impl TerminalSurface {
    pub fn stdout(title: impl Into<String>) -> Self {
        Self::new(std::io::stdout(), title)
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, title: impl Into<String>) -> Self {
        Self {
            out,
            title: title.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn border(&mut self, left: char, right: char) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{}{}{}",
            left,
            "─".repeat(LABEL_WIDTH + VALUE_WIDTH + 5),
            right
        )
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn set(&mut self, field: DisplayField, text: String) -> bool {
        self.fields.insert(field, text);
        true
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.fields.is_empty() {
            return Ok(());
        }

        let fields = std::mem::take(&mut self.fields);
        let title = self.title.clone();

        self.border('┌', '┐')?;
        writeln!(
            self.out,
            "│  {:<width$} │",
            title,
            width = LABEL_WIDTH + VALUE_WIDTH + 2
        )?;
        self.border('├', '┤')?;
        for (field, text) in &fields {
            writeln!(
                self.out,
                "│  {:<lw$} : {:>vw$} │",
                field.label(),
                text,
                lw = LABEL_WIDTH,
                vw = VALUE_WIDTH
            )?;
        }
        self.border('└', '┘')?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_prints_labels_and_values() {
        let mut surface = TerminalSurface::new(Vec::new(), "ARUB statistics");
        surface.set(DisplayField::ArubPrice, "$99.50".to_string());
        surface.set(DisplayField::CurrentApy, "8%".to_string());
        surface.flush().unwrap();

        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert!(out.contains("ARUB statistics"));
        assert!(out.contains("ARUB price"));
        assert!(out.contains("$99.50"));
        assert!(out.contains("APY"));
    }

    #[test]
    fn flush_clears_pending_fields() {
        let mut surface = TerminalSurface::new(Vec::new(), "t");
        surface.set(DisplayField::ArubPrice, "$1.00".to_string());
        surface.flush().unwrap();
        surface.flush().unwrap();

        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(out.matches("$1.00").count(), 1);
    }
}
