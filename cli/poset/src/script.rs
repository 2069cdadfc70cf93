//! Line-oriented poset scripts.
//!
//! One command per line, arguments separated by whitespace:
//!
//! ```text
//! # comment
//! new
//! insert 0 A
//! add 0 A B
//! test 0 A B
//! dump 0
//! ```
//!
//! Labels therefore cannot contain whitespace.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use poset_core::{PosetEngine, PosetId, PosetSnapshot};
use serde_json::json;

use crate::manifest::OutputFormat;

/// A parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Insert { poset: PosetId, label: String },
    Test { poset: PosetId, lower: String, upper: String },
    Add { poset: PosetId, lower: String, upper: String },
    Remove { poset: PosetId, label: String },
    Del { poset: PosetId, lower: String, upper: String },
    Size { poset: PosetId },
    Clear { poset: PosetId },
    Delete { poset: PosetId },
    Dump { poset: PosetId },
}

impl Command {
    /// Keyword the command is written with.
    pub fn name(&self) -> &'static str {
        match self {
            Command::New => "new",
            Command::Insert { .. } => "insert",
            Command::Test { .. } => "test",
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Del { .. } => "del",
            Command::Size { .. } => "size",
            Command::Clear { .. } => "clear",
            Command::Delete { .. } => "delete",
            Command::Dump { .. } => "dump",
        }
    }
}

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(PosetId),
    Flag(bool),
    Count(usize),
    Done,
    Snapshot(Option<PosetSnapshot>),
}

impl Outcome {
    /// Render for text output.
    pub fn to_text(&self) -> Result<String> {
        Ok(match self {
            Outcome::Created(id) => id.to_string(),
            Outcome::Flag(b) => b.to_string(),
            Outcome::Count(n) => n.to_string(),
            Outcome::Done => "ok".to_string(),
            Outcome::Snapshot(Some(snap)) => serde_json::to_string(snap)?,
            Outcome::Snapshot(None) => "null".to_string(),
        })
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Outcome::Created(id) => json!(id),
            Outcome::Flag(b) => json!(b),
            Outcome::Count(n) => json!(n),
            Outcome::Done => serde_json::Value::Null,
            Outcome::Snapshot(snap) => json!(snap),
        }
    }
}

/// Parse one line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = match line.split_once('#') {
        Some((code, _)) => code,
        None => line,
    };
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let expect = |count: usize| -> Result<()> {
        if args.len() != count {
            bail!(
                "'{keyword}' takes {count} argument(s), got {}",
                args.len()
            );
        }
        Ok(())
    };
    let poset = |raw: &str| -> Result<PosetId> {
        raw.parse::<u64>()
            .map(PosetId::new)
            .with_context(|| format!("invalid poset id '{raw}'"))
    };

    let command = match keyword {
        "new" => {
            expect(0)?;
            Command::New
        }
        "insert" | "remove" => {
            expect(2)?;
            let poset = poset(args[0])?;
            let label = args[1].to_string();
            if keyword == "insert" {
                Command::Insert { poset, label }
            } else {
                Command::Remove { poset, label }
            }
        }
        "test" | "add" | "del" => {
            expect(3)?;
            let poset = poset(args[0])?;
            let lower = args[1].to_string();
            let upper = args[2].to_string();
            match keyword {
                "test" => Command::Test { poset, lower, upper },
                "add" => Command::Add { poset, lower, upper },
                _ => Command::Del { poset, lower, upper },
            }
        }
        "size" | "clear" | "delete" | "dump" => {
            expect(1)?;
            let poset = poset(args[0])?;
            match keyword {
                "size" => Command::Size { poset },
                "clear" => Command::Clear { poset },
                "delete" => Command::Delete { poset },
                _ => Command::Dump { poset },
            }
        }
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

/// Run one command against `engine`.
pub fn execute(engine: &mut PosetEngine, command: &Command) -> Outcome {
    match command {
        Command::New => Outcome::Created(engine.new_poset()),
        Command::Insert { poset, label } => Outcome::Flag(engine.insert(*poset, label)),
        Command::Test { poset, lower, upper } => Outcome::Flag(engine.test(*poset, lower, upper)),
        Command::Add { poset, lower, upper } => Outcome::Flag(engine.add(*poset, lower, upper)),
        Command::Remove { poset, label } => Outcome::Flag(engine.remove(*poset, label)),
        Command::Del { poset, lower, upper } => Outcome::Flag(engine.del(*poset, lower, upper)),
        Command::Size { poset } => Outcome::Count(engine.size(*poset)),
        Command::Clear { poset } => {
            engine.clear(*poset);
            Outcome::Done
        }
        Command::Delete { poset } => {
            engine.delete(*poset);
            Outcome::Done
        }
        Command::Dump { poset } => Outcome::Snapshot(engine.snapshot(*poset)),
    }
}

/// Execute every command read from `input`, writing one result per command.
///
/// Stops at the first malformed line, reporting its line number.
pub fn run<R: BufRead, W: Write>(
    engine: &mut PosetEngine,
    input: R,
    output: &mut W,
    format: OutputFormat,
) -> Result<usize> {
    let mut executed = 0;
    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("reading line {number}"))?;
        let Some(command) =
            parse_line(&line).with_context(|| format!("line {number}: {}", line.trim()))?
        else {
            continue;
        };

        let outcome = execute(engine, &command);
        match format {
            OutputFormat::Text => writeln!(output, "{}", outcome.to_text()?)?,
            OutputFormat::Json => {
                let record = json!({
                    "line": number,
                    "op": command.name(),
                    "result": outcome.to_json(),
                });
                writeln!(output, "{record}")?;
            }
        }
        executed += 1;
    }
    Ok(executed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_text(script: &str) -> String {
        let mut engine = PosetEngine::default();
        let mut out = Vec::new();
        run(&mut engine, script.as_bytes(), &mut out, OutputFormat::Text).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(parse_line("new").unwrap(), Some(Command::New));
        assert_eq!(
            parse_line("  add 3 x y  ").unwrap(),
            Some(Command::Add {
                poset: PosetId::new(3),
                lower: "x".into(),
                upper: "y".into(),
            })
        );
        assert_eq!(
            parse_line("dump 1 # show it").unwrap(),
            Some(Command::Dump {
                poset: PosetId::new(1)
            })
        );
    }

    #[test]
    fn parse_skips_blank_and_comments() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# nothing").unwrap(), None);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse_line("frobnicate 1").is_err());
        assert!(parse_line("insert 0").is_err());
        assert!(parse_line("insert x A").is_err());
        assert!(parse_line("new 1").is_err());
        assert!(parse_line("size -1").is_err());
    }

    #[test]
    fn chain_script() {
        let out = run_text(
            "new\n\
             insert 0 A\n\
             insert 0 B\n\
             insert 0 C\n\
             add 0 A B\n\
             add 0 B C\n\
             test 0 A C\n\
             add 0 C A\n\
             remove 0 B\n\
             test 0 A C\n\
             size 0\n\
             delete 0\n\
             size 0\n",
        );
        assert_eq!(
            out.lines().collect::<Vec<_>>(),
            vec![
                "0", "true", "true", "true", "true", "true", "true", "false", "true", "true",
                "2", "ok", "0"
            ]
        );
    }

    #[test]
    fn demo_script() {
        let out = run_text(include_str!("../../../demos/chain.poset"));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 27);
        assert_eq!(&lines[..10], &["0", "true", "true", "true", "true", "true", "true", "false", "true", "true"]);
        let snap: serde_json::Value = serde_json::from_str(lines[10]).unwrap();
        assert_eq!(snap["elements"], json!(["A", "C"]));
        assert_eq!(snap["witnesses"], json!([{"lower": "A", "upper": "C"}]));
        assert_eq!(
            &lines[11..],
            &[
                "1", "true", "true", "true", "true", "true", "true", "true", "false", "true",
                "true", "true", "false", "4", "ok", "0"
            ]
        );
    }

    #[test]
    fn dump_prints_snapshot() {
        let out = run_text("new\ninsert 0 a\ninsert 0 b\nadd 0 a b\ndump 0\ndump 5\n");
        let lines: Vec<_> = out.lines().collect();
        let snap: serde_json::Value = serde_json::from_str(lines[4]).unwrap();
        assert_eq!(snap["elements"], json!(["a", "b"]));
        assert_eq!(snap["witnesses"][0]["upper"], "b");
        assert_eq!(lines[5], "null");
    }

    #[test]
    fn json_format_records_line_numbers() {
        let mut engine = PosetEngine::default();
        let mut out = Vec::new();
        let executed = run(
            &mut engine,
            "# setup\nnew\n\ninsert 0 A\n".as_bytes(),
            &mut out,
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(executed, 2);

        let text = String::from_utf8(out).unwrap();
        let records: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records[0], json!({"line": 2, "op": "new", "result": 0}));
        assert_eq!(records[1], json!({"line": 4, "op": "insert", "result": true}));
    }

    #[test]
    fn malformed_line_reports_number() {
        let mut engine = PosetEngine::default();
        let mut out = Vec::new();
        let err = run(
            &mut engine,
            "new\ninsert 0\n".as_bytes(),
            &mut out,
            OutputFormat::Text,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert_eq!(String::from_utf8(out).unwrap(), "0\n");
    }
}
