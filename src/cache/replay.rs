//! Replay Log Module
//!
//! Rebuilds a readable call trace from the recorded input/output lists.

use std::fmt;
use std::iter;

use serde::Serialize;

// == Call Record ==
/// One recorded call: its argument tuple paired with its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub method_name: String,
    pub inputs: String,
    pub output: String,
    pub sequence_index: usize,
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(*{}) -> {}", self.method_name, self.inputs, self.output)
    }
}

// == Replay Log ==
/// Formatted trace of every recorded call to one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayLog {
    method_name: String,
    total_calls: usize,
    records: Vec<CallRecord>,
}

impl ReplayLog {
    // == Constructor ==
    /// Pairs inputs and outputs by position.
    ///
    /// Pairing stops at the shorter list: an input whose call failed before
    /// its output was recorded does not appear as a line, although it still
    /// counts toward `total_calls`.
    pub fn from_history(method_name: &str, inputs: Vec<String>, outputs: Vec<String>) -> Self {
        let total_calls = inputs.len();
        let records = inputs
            .into_iter()
            .zip(outputs)
            .enumerate()
            .map(|(sequence_index, (inputs, output))| CallRecord {
                method_name: method_name.to_string(),
                inputs,
                output,
                sequence_index,
            })
            .collect();

        Self {
            method_name: method_name.to_string(),
            total_calls,
            records,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Number of recorded inputs, paired or not.
    pub fn total_calls(&self) -> usize {
        self.total_calls
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn header(&self) -> String {
        format!("{} was called {} times:", self.method_name, self.total_calls)
    }

    // == Lines ==
    /// Header followed by one line per paired call, formatted on demand.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        iter::once(self.header()).chain(self.records.iter().map(CallRecord::to_string))
    }
}

impl fmt::Display for ReplayLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&line)?;
        }
        Ok(())
    }
}
