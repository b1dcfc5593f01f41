use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::IguaneError;
use crate::spec::lexer::{Token, TokenKind, tokenize};
use crate::spec::types::{Field, HardwareRecord, SpecTable, Value};

/// Parse a GPU data file into a [`SpecTable`].
///
/// Files with a `.json` extension go through [`parse_table_json`],
/// everything else through the legacy record grammar of
/// [`parse_table_str`].
///
/// # Errors
///
/// Returns [`IguaneError::Io`] if the file cannot be read, or the
/// error of the selected parser.
pub fn parse_table(path: &Path) -> Result<SpecTable, IguaneError> {
    let content = std::fs::read_to_string(path)?;
    let table = if path.extension().is_some_and(|ext| ext == "json") {
        parse_table_json(&content)?
    } else {
        parse_table_str(&content)?
    };
    tracing::debug!(path = %path.display(), gpus = table.len(), "loaded GPU data file");
    Ok(table)
}

/// Parse the legacy record format.
///
/// ```text
/// [
///     GPU(name="A100-SXM4-40GB", fp32=19.5, tf32=156, fp16=312, fp64=9.7, memgb=40, membw=1555),
///     GPU(name='K80', fp32=4.37, fp16=None, memgb=12, membw=240),  # comment
/// ]
/// ```
///
/// Any malformed record fails the whole load with
/// [`IguaneError::Parse`] carrying the offending line.
pub fn parse_table_str(src: &str) -> Result<SpecTable, IguaneError> {
    let tokens = tokenize(src)?;
    let raw = Parser { tokens, pos: 0 }.document()?;

    let mut table = SpecTable::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for record in raw {
        let line = record.line;
        let hw = record.into_hardware()?;
        let name = hw.name.clone();
        if table.insert(hw).is_err() {
            let first = first_seen.get(&name).copied().unwrap_or(line);
            return Err(IguaneError::parse(
                line,
                format!("duplicate GPU name '{name}' (first defined on line {first})"),
            ));
        }
        first_seen.insert(name, line);
    }
    tracing::debug!(gpus = table.len(), format = "legacy", "parsed GPU table");
    Ok(table)
}

/// Parse the JSON form: an object keyed by GPU name.
///
/// ```json
/// { "T4": { "fp16": 65.0, "fp32": 8.1, "fp64": 0.25, "tf32": null, "memgb": 16, "membw": 320 } }
/// ```
pub fn parse_table_json(src: &str) -> Result<SpecTable, IguaneError> {
    let JsonEntries(entries) = serde_json::from_str(src)?;
    let mut table = SpecTable::new();
    for (name, mut record) in entries {
        record.name = name;
        check_record_values(&record)?;
        if let Err(duplicate) = table.insert(record) {
            return Err(IguaneError::parse(
                0,
                format!("duplicate GPU name '{}'", duplicate.name),
            ));
        }
    }
    tracing::debug!(gpus = table.len(), format = "json", "parsed GPU table");
    Ok(table)
}

/// The top-level JSON object in document order. A map type would keep only
/// the last of two entries with the same name.
struct JsonEntries(Vec<(String, HardwareRecord)>);

impl<'de> Deserialize<'de> for JsonEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = JsonEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by GPU name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, HardwareRecord>()? {
                    entries.push(entry);
                }
                Ok(JsonEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn check_record_values(record: &HardwareRecord) -> Result<(), IguaneError> {
    for field in Field::ALL {
        if let Some(v) = record.get(field)
            && !(v.is_finite() && v >= 0.0)
        {
            return Err(IguaneError::parse(
                0,
                format!(
                    "field '{field}' of GPU '{}' must be a non-negative number, found {v}",
                    record.name
                ),
            ));
        }
    }
    Ok(())
}

/// A record as written, before coercion.
#[derive(Debug)]
struct RawRecord {
    line: usize,
    fields: Vec<RawField>,
}

#[derive(Debug)]
struct RawField {
    key: String,
    value: Value,
    line: usize,
}

impl RawRecord {
    fn into_hardware(self) -> Result<HardwareRecord, IguaneError> {
        let record_line = self.line;
        let mut name = None;
        let mut numbers: BTreeMap<Field, Option<f64>> = BTreeMap::new();
        let mut extra = BTreeMap::new();

        for RawField { key, value, line } in self.fields {
            if key == "name" {
                match value {
                    Value::Text(s) if !s.is_empty() => name = Some(s),
                    other => {
                        return Err(IguaneError::parse(
                            line,
                            format!("'name' must be a non-empty string, found {}", other.kind()),
                        ));
                    }
                }
            } else if let Some(field) = Field::from_key(&key) {
                let number = match value {
                    Value::Null if field.is_nullable() => None,
                    Value::Number(n) if n.is_finite() && n >= 0.0 => Some(n),
                    Value::Number(n) => {
                        return Err(IguaneError::parse(
                            line,
                            format!("field '{field}' must be non-negative, found {n}"),
                        ));
                    }
                    other => {
                        return Err(IguaneError::parse(
                            line,
                            format!("field '{field}' must be numeric, found {other}"),
                        ));
                    }
                };
                numbers.insert(field, number);
            } else {
                extra.insert(key, value);
            }
        }

        let name = name
            .ok_or_else(|| IguaneError::parse(record_line, "record has no 'name' field"))?;
        let required = |field: Field| {
            numbers.get(&field).copied().flatten().ok_or_else(|| {
                IguaneError::parse(
                    record_line,
                    format!("GPU '{name}' is missing required field '{field}'"),
                )
            })
        };
        let memgb = required(Field::Memgb)?;
        let membw = required(Field::Membw)?;
        let optional = |field: Field| numbers.get(&field).copied().flatten();

        Ok(HardwareRecord {
            fp16: optional(Field::Fp16),
            fp32: optional(Field::Fp32),
            fp64: optional(Field::Fp64),
            tf32: optional(Field::Tf32),
            memgb,
            membw,
            extra,
            name,
        })
    }
}

/// Recursive-descent parser over the token stream.
///
/// ```text
/// document := '[' records ']' EOF | records EOF
/// records  := ( record ( ',' record )* ','? )?
/// record   := IDENT '(' ( pair ( ',' pair )* ','? )? ')'
/// pair     := IDENT '=' ( NUMBER | STRING | IDENT )
/// ```
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn unexpected(token: &Token, expected: &str) -> IguaneError {
        IguaneError::parse(
            token.line,
            format!("expected {expected}, found {}", token.kind.describe()),
        )
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, IguaneError> {
        let token = self.advance();
        if &token.kind == kind {
            Ok(token)
        } else {
            Err(Self::unexpected(&token, expected))
        }
    }

    fn document(mut self) -> Result<Vec<RawRecord>, IguaneError> {
        let records = if self.peek().kind == TokenKind::LBracket {
            let open = self.advance();
            let records = self.records(&TokenKind::RBracket, open.line, '[')?;
            self.expect(&TokenKind::RBracket, "']'")?;
            records
        } else {
            self.records(&TokenKind::Eof, 0, ' ')?
        };
        self.expect(&TokenKind::Eof, "end of input")?;
        Ok(records)
    }

    fn records(
        &mut self,
        close: &TokenKind,
        open_line: usize,
        open: char,
    ) -> Result<Vec<RawRecord>, IguaneError> {
        let mut records = Vec::new();
        loop {
            match &self.peek().kind {
                k if k == close => break,
                TokenKind::Eof => return Err(self.unclosed(open, open_line)),
                _ => {}
            }
            records.push(self.record()?);
            match &self.peek().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                k if k == close => break,
                TokenKind::Eof => return Err(self.unclosed(open, open_line)),
                _ => return Err(Self::unexpected(self.peek(), "',' between records")),
            }
        }
        Ok(records)
    }

    fn unclosed(&self, open: char, open_line: usize) -> IguaneError {
        IguaneError::parse(
            self.peek().line,
            format!("unclosed '{open}' opened on line {open_line}"),
        )
    }

    fn record(&mut self) -> Result<RawRecord, IguaneError> {
        let head = self.advance();
        if !matches!(head.kind, TokenKind::Ident(_)) {
            return Err(Self::unexpected(&head, "a record such as GPU(...)"));
        }
        let open = self.expect(&TokenKind::LParen, "'(' after record name")?;

        let mut fields: Vec<RawField> = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RParen => break,
                TokenKind::Eof | TokenKind::RBracket => return Err(self.unclosed('(', open.line)),
                _ => {}
            }
            let field = self.pair()?;
            if fields.iter().any(|f| f.key == field.key) {
                return Err(IguaneError::parse(
                    field.line,
                    format!("duplicate key '{}' in record", field.key),
                ));
            }
            fields.push(field);
            match self.peek().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => break,
                TokenKind::Eof | TokenKind::RBracket => return Err(self.unclosed('(', open.line)),
                _ => return Err(Self::unexpected(self.peek(), "',' or ')'")),
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;

        Ok(RawRecord {
            line: head.line,
            fields,
        })
    }

    fn pair(&mut self) -> Result<RawField, IguaneError> {
        let key_token = self.advance();
        let key = match &key_token.kind {
            TokenKind::Ident(k) => k.clone(),
            _ => return Err(Self::unexpected(&key_token, "a key")),
        };
        self.expect(&TokenKind::Equals, "'=' after key")?;
        let value_token = self.advance();
        let value_line = value_token.line;
        let value = match value_token.kind {
            TokenKind::Number(n) => Value::Number(n),
            TokenKind::Str(s) => Value::Text(s),
            TokenKind::Ident(ident) => match ident.as_str() {
                "None" => Value::Null,
                "True" => Value::Bool(true),
                "False" => Value::Bool(false),
                _ => Value::Text(ident),
            },
            other => {
                return Err(IguaneError::parse(
                    value_line,
                    format!("expected a value for '{key}', found {}", other.describe()),
                ));
            }
        };
        Ok(RawField {
            key,
            value,
            line: key_token.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TABLE: &str = r#"
# two records
[
    GPU(name="A100-SXM4-40GB", vendor="nvidia", fp64=9.7, fp32=19.5, tf32=156, fp16=312, memgb=40, membw=1555),
    GPU(name='K80', vendor=nvidia, fp64=1.45, fp32=4.37, tf32=None, fp16=None, memgb=12, membw=240),
]
"#;

    #[test]
    fn parse_minimal_table() {
        let table = parse_table_str(MINIMAL_TABLE).unwrap();
        assert_eq!(table.len(), 2);
        let a100 = table.get("A100-SXM4-40GB").unwrap();
        assert_eq!(a100.fp32, Some(19.5));
        assert_eq!(a100.tf32, Some(156.0));
        assert_eq!(a100.memgb, 40.0);
        assert_eq!(a100.vendor(), Some("nvidia"));
    }

    #[test]
    fn none_parses_to_null() {
        let table = parse_table_str(MINIMAL_TABLE).unwrap();
        let k80 = table.get("K80").unwrap();
        assert_eq!(k80.fp16, None);
        assert_eq!(k80.tf32, None);
    }

    #[test]
    fn bare_identifier_value_is_text() {
        let table = parse_table_str(MINIMAL_TABLE).unwrap();
        assert_eq!(table.get("K80").unwrap().vendor(), Some("nvidia"));
    }

    #[test]
    fn absent_throughput_key_is_null() {
        let table = parse_table_str("GPU(name='X', fp32=1, memgb=1, membw=1)").unwrap();
        let x = table.get("X").unwrap();
        assert_eq!(x.fp64, None);
        assert_eq!(x.fp16, None);
    }

    #[test]
    fn trailing_commas_are_accepted() {
        let with = "[GPU(name='X', fp32=1, memgb=2, membw=3,),]";
        let without = "[GPU(name='X', fp32=1, memgb=2, membw=3)]";
        assert_eq!(parse_table_str(with).unwrap(), parse_table_str(without).unwrap());
    }

    #[test]
    fn outer_list_is_optional() {
        let bare = "GPU(name='X', fp32=1, memgb=2, membw=3),\nGPU(name='Y', fp32=1, memgb=2, membw=3)";
        let table = parse_table_str(bare).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["X", "Y"]);
    }

    #[test]
    fn record_may_span_lines() {
        let src = "GPU(name='X',\n    fp32=1,  # note\n    memgb=2, membw=3)";
        assert!(parse_table_str(src).is_ok());
    }

    #[test]
    fn empty_input_is_empty_table() {
        assert!(parse_table_str("# nothing\n").unwrap().is_empty());
        assert!(parse_table_str("[]").unwrap().is_empty());
    }

    #[test]
    fn booleans_are_kept_in_extra() {
        let table = parse_table_str("GPU(name='X', nvlink=True, memgb=2, membw=3)").unwrap();
        assert_eq!(table.get("X").unwrap().extra["nvlink"], Value::Bool(true));
    }

    fn parse_err_line(src: &str) -> (usize, String) {
        match parse_table_str(src).unwrap_err() {
            IguaneError::Parse { line, message } => (line, message),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_gpu_name_fails() {
        let src = "[\nGPU(name='X', memgb=1, membw=1),\nGPU(name='X', memgb=2, membw=2),\n]";
        let (line, msg) = parse_err_line(src);
        assert_eq!(line, 3);
        assert!(msg.contains("duplicate GPU name 'X'"));
        assert!(msg.contains("line 2"));
    }

    #[test]
    fn non_numeric_value_in_numeric_field_fails() {
        let (line, msg) = parse_err_line("\n\nGPU(name='X', fp32='fast', memgb=1, membw=1)");
        assert_eq!(line, 3);
        assert!(msg.contains("fp32"));
    }

    #[test]
    fn line_continuation_inside_string_keeps_line_numbers() {
        let src = "GPU(name='A\\\nB', memgb=1, membw=1),\nGPU(name='C', fp32=oops, memgb=1, membw=1)";
        let (line, msg) = parse_err_line(src);
        assert_eq!(line, 3);
        assert!(msg.contains("fp32"));
    }

    #[test]
    fn line_continuation_is_dropped_from_the_name() {
        let table = parse_table_str("GPU(name='A\\\nB', memgb=1, membw=1)").unwrap();
        assert!(table.contains("AB"));
    }

    #[test]
    fn negative_value_fails() {
        let (_, msg) = parse_err_line("GPU(name='X', fp32=-1, memgb=1, membw=1)");
        assert!(msg.contains("non-negative"));
    }

    #[test]
    fn null_memory_fails() {
        let (_, msg) = parse_err_line("GPU(name='X', memgb=None, membw=1)");
        assert!(msg.contains("memgb"));
    }

    #[test]
    fn missing_memory_fails() {
        let (_, msg) = parse_err_line("GPU(name='X', memgb=1)");
        assert!(msg.contains("missing required field 'membw'"));
    }

    #[test]
    fn missing_name_fails() {
        let (_, msg) = parse_err_line("GPU(memgb=1, membw=1)");
        assert!(msg.contains("no 'name'"));
    }

    #[test]
    fn unbalanced_paren_fails() {
        let (line, msg) = parse_err_line("[\nGPU(name='X', memgb=1, membw=1\n]");
        assert_eq!(line, 3);
        assert!(msg.contains("unclosed '(' opened on line 2"));
    }

    #[test]
    fn unbalanced_bracket_fails() {
        let (_, msg) = parse_err_line("[GPU(name='X', memgb=1, membw=1)");
        assert!(msg.contains("unclosed '['"));
    }

    #[test]
    fn stray_closer_fails() {
        let (_, msg) = parse_err_line("GPU(name='X', memgb=1, membw=1))");
        assert!(msg.contains("found ')'"));
    }

    #[test]
    fn missing_comma_between_records_fails() {
        let (_, msg) =
            parse_err_line("GPU(name='X', memgb=1, membw=1) GPU(name='Y', memgb=1, membw=1)");
        assert!(msg.contains("',' between records"));
    }

    #[test]
    fn duplicate_key_in_record_fails() {
        let (_, msg) = parse_err_line("GPU(name='X', fp32=1, fp32=2, memgb=1, membw=1)");
        assert!(msg.contains("duplicate key 'fp32'"));
    }

    #[test]
    fn parse_json_table() {
        let json = r#"{
            "T4": {"fp16": 65.0, "fp32": 8.1, "fp64": 0.25, "tf32": null, "memgb": 16, "membw": 320, "vendor": "nvidia"}
        }"#;
        let table = parse_table_json(json).unwrap();
        let t4 = table.get("T4").unwrap();
        assert_eq!(t4.name, "T4");
        assert_eq!(t4.tf32, None);
        assert_eq!(t4.memgb, 16.0);
        assert_eq!(t4.vendor(), Some("nvidia"));
    }

    #[test]
    fn parse_json_rejects_string_numbers() {
        let json = r#"{"T4": {"fp32": "8.1", "memgb": 16, "membw": 320}}"#;
        assert!(matches!(parse_table_json(json), Err(IguaneError::Json(_))));
    }

    #[test]
    fn parse_json_rejects_negative_numbers() {
        let json = r#"{"T4": {"fp32": -8.1, "memgb": 16, "membw": 320}}"#;
        assert!(matches!(parse_table_json(json), Err(IguaneError::Parse { .. })));
    }

    #[test]
    fn parse_json_rejects_duplicate_gpu_name() {
        let json = r#"{
            "T4": {"fp32": 8.1, "memgb": 16, "membw": 320},
            "T4": {"fp32": 99.0, "memgb": 16, "membw": 320}
        }"#;
        match parse_table_json(json) {
            Err(IguaneError::Parse { message, .. }) => {
                assert!(message.contains("duplicate GPU name 'T4'"), "{message}");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn parse_json_rejects_non_object() {
        assert!(matches!(parse_table_json("[1, 2]"), Err(IguaneError::Json(_))));
    }

    #[test]
    fn legacy_and_json_agree() {
        let legacy = parse_table_str(MINIMAL_TABLE).unwrap();
        let json = legacy.to_json_pretty().unwrap();
        assert_eq!(parse_table_json(&json).unwrap(), legacy);
    }

    #[test]
    fn parse_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("gpus.txt");
        std::fs::write(&txt, MINIMAL_TABLE).unwrap();
        let from_txt = parse_table(&txt).unwrap();

        let json = dir.path().join("gpus.json");
        std::fs::write(&json, from_txt.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parse_table(&json).unwrap(), from_txt);
    }

    #[test]
    fn parse_table_nonexistent_file() {
        let result = parse_table(Path::new("/nonexistent/gpuflops.txt"));
        assert!(matches!(result, Err(IguaneError::Io(_))));
    }
}
