//! OUT serializers: CSV dumps of the DDG and of a provenance stream.
//!
//! Hand-rolled rather than built on a CSV crate — the schemas are two
//! fixed, narrow column sets, not a general tabular format.

use crate::ddg::Ddg;
use crate::provenance::ProvenanceNode;
use std::fmt::Write as _;
use std::io;

fn quote_field(field: &str, out: &mut String) {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        out.push('"');
        for ch in field.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}

fn push_row(line: &mut String, fields: &[&str]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            line.push(',');
        }
        quote_field(field, line);
    }
    line.push('\n');
}

/// Writes `src,src_type,dst,dst_type,label` rows for every DDG edge.
/// Row order is not guaranteed stable across runs (the DDG's adjacency is
/// a `HashMap`); callers that need determinism should sort the input
/// beforehand.
pub fn write_ddg_csv<W: io::Write>(ddg: &Ddg, mut out: W) -> io::Result<()> {
    let mut buf = String::new();
    for (src, dst, label) in ddg.iter_edges() {
        let src_ty = ddg.type_of(src).map(String::as_str).unwrap_or("");
        let dst_ty = ddg.type_of(dst).map(String::as_str).unwrap_or("");
        push_row(&mut buf, &[src.as_str(), src_ty, dst.as_str(), dst_ty, label.as_str()]);
    }
    out.write_all(buf.as_bytes())
}

/// Writes `action,artifact,id` rows for a provenance stream.
pub fn write_provenance_csv<W: io::Write>(stream: &[ProvenanceNode], mut out: W) -> io::Result<()> {
    let mut buf = String::new();
    for node in stream {
        push_row(&mut buf, &[node.action.as_str(), node.artifact.as_str(), node.id.as_str()]);
    }
    out.write_all(buf.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddg::labels;
    use crate::ir::Operand;

    #[test]
    fn ddg_csv_row_has_five_comma_separated_fields() {
        let mut ddg = Ddg::new();
        ddg.add_edge(&Operand::new("%x", "i32"), &Operand::new("%1", "ptr"), labels::store());
        let mut out = Vec::new();
        write_ddg_csv(&ddg, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "%x,i32,%1,ptr,store\n");
    }

    #[test]
    fn provenance_csv_row_has_three_fields() {
        let stream = vec![ProvenanceNode {
            action: "load".to_string(),
            artifact: "PROCESS".to_string(),
            id: "proc_start".to_string(),
        }];
        let mut out = Vec::new();
        write_provenance_csv(&stream, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "load,PROCESS,proc_start\n");
    }

    #[test]
    fn fields_containing_commas_are_quoted() {
        let mut line = String::new();
        push_row(&mut line, &["a,b", "plain", "c\"d"]);
        assert_eq!(line, "\"a,b\",plain,\"c\"\"d\"\n");
    }
}
