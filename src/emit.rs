//! Record Emitter
//!
//! Serializes entity records into the search file. The output schema is
//! fixed and hand-specified, so records are written directly with `write!`
//! instead of going through a JSON library; [`RecordWriter`] owns the
//! separator state so a comma appears between records, never before the
//! first or after the last.
//!
//! Records are appended only after their content is fully determined, so an
//! error mid-computation never leaves a half-written record in the stream.

use std::io::{self, Write};

use itertools::Itertools;

use crate::candidates::{call_switch, CandidateSet};

/// Escape a name for embedding in a JSON string literal.
fn json_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render a candidate set as its JSON value: a list for real candidates, a
/// bare string for the fixed diagnostic labels.
fn render_candidates(set: &CandidateSet) -> String {
    match set {
        CandidateSet::Candidates(labels) => {
            let body = labels
                .iter()
                .map(|label| format!("\"{}\"", json_escape(label)))
                .join(", ");
            format!("[{}]", body)
        }
        CandidateSet::Fixed(label) => format!("\"{}\"", json_escape(label)),
    }
}

/// Incremental writer for the search file's `config` array.
///
/// Opens the document on construction, appends one record per call, and
/// closes the array in [`finish`](RecordWriter::finish). Nothing is buffered
/// once written.
pub struct RecordWriter<W: Write> {
    out: W,
    first: bool,
}

impl<W: Write> RecordWriter<W> {
    /// Open the document and write the header.
    pub fn new(mut out: W) -> io::Result<Self> {
        write!(out, "{{\"config\": [\n")?;
        Ok(RecordWriter { out, first: true })
    }

    /// Close the array and hand the stream back.
    pub fn finish(mut self) -> io::Result<W> {
        write!(self.out, "\n]}}\n")?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn separator(&mut self) -> io::Result<()> {
        if self.first {
            self.first = false;
        } else {
            write!(self.out, ",\n")?;
        }
        Ok(())
    }

    /// Append a global-variable record.
    pub fn global_var(&mut self, name: &str, set: &CandidateSet) -> io::Result<()> {
        self.separator()?;
        write!(
            self.out,
            "\t{{\"globalVar\": {{\n\t\t\"name\": \"{}\",\n\t\t\"type\": {}\n\t}}}}",
            json_escape(name),
            render_candidates(set)
        )
    }

    /// Append a local-variable record. The source file is best-effort and the
    /// field is omitted when unknown.
    pub fn local_var(
        &mut self,
        file: Option<&str>,
        function: &str,
        name: &str,
        set: &CandidateSet,
    ) -> io::Result<()> {
        self.separator()?;
        write!(self.out, "\t{{\"localVar\": {{\n")?;
        if let Some(file) = file {
            write!(self.out, "\t\t\"file\": \"{}\",\n", json_escape(file))?;
        }
        write!(
            self.out,
            "\t\t\"function\": \"{}\",\n\t\t\"name\": \"{}\",\n\t\t\"type\": {}\n\t}}}}",
            json_escape(function),
            json_escape(name),
            render_candidates(set)
        )
    }

    /// Append an operation record with the fixed scalar candidate triple.
    pub fn operation(
        &mut self,
        id: &str,
        function: &str,
        opcode: &str,
        set: &CandidateSet,
    ) -> io::Result<()> {
        self.separator()?;
        write!(
            self.out,
            "\t{{\"op\": {{\n\t\t\"id\": \"{}\",\n\t\t\"function\": \"{}\",\n\t\t\"name\": \"{}\",\n\t\t\"type\": {}\n\t}}}}",
            json_escape(id),
            json_escape(function),
            json_escape(opcode),
            render_candidates(set)
        )
    }

    /// Append a tunable-call record with its replacement switch table.
    pub fn call(&mut self, id: &str, function: &str, callee: &str) -> io::Result<()> {
        self.separator()?;
        let [single, double] = call_switch(callee);
        write!(
            self.out,
            "\t{{\"call\": {{\n\t\t\"id\": \"{}\",\n\t\t\"function\": \"{}\",\n\t\t\"name\": \"{}\",\n\t\t\"switch\": [\"{}\",\"{}\"],\n\t\t\"type\": [[\"float\",\"float\"], [\"double\",\"double\"]]\n\t}}}}",
            json_escape(id),
            json_escape(function),
            json_escape(callee),
            json_escape(&single),
            json_escape(&double)
        )
    }
}
