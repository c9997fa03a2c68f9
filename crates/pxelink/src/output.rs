use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result that can be printed in every output format.
pub trait Record: Serialize {
    /// Ordered field/value pairs for table and pretty output.
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// One-line summary for raw output.
    fn summary(&self) -> String;
}

pub fn print_record<R: Record>(record: &R, format: OutputFormat) {
    println!("{}", render(record, format));
}

fn render<R: Record>(record: &R, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (name, value) in record.fields() {
                table.add_row(vec![name.to_string(), value]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => record
            .fields()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(" "),
        OutputFormat::Raw => record.summary(),
    }
}

pub fn hex32(value: u32) -> String {
    format!("{value:#010x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        size: u32,
        name: &'static str,
    }

    impl Record for Sample {
        fn fields(&self) -> Vec<(&'static str, String)> {
            vec![("size", self.size.to_string()), ("name", self.name.to_string())]
        }

        fn summary(&self) -> String {
            format!("{} bytes", self.size)
        }
    }

    const SAMPLE: Sample = Sample {
        size: 532,
        name: "A:\\HELLO.PXE",
    };

    #[test]
    fn json_is_single_line() {
        let out = render(&SAMPLE, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["size"], 532);
        assert!(!out.contains('\n'));
    }

    #[test]
    fn pretty_and_raw() {
        assert_eq!(
            render(&SAMPLE, OutputFormat::Pretty),
            "size=532 name=A:\\HELLO.PXE"
        );
        assert_eq!(render(&SAMPLE, OutputFormat::Raw), "532 bytes");
    }

    #[test]
    fn table_lists_fields() {
        let out = render(&SAMPLE, OutputFormat::Table);
        assert!(out.contains("FIELD"));
        assert!(out.contains("532"));
    }

    #[test]
    fn hex_is_zero_padded() {
        assert_eq!(hex32(0x54), "0x00000054");
    }
}
