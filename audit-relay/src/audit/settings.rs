//! Embedded node-settings extraction for `PARAMETERS` events
//!
//! A `PARAMETERS` log message carries the executed node's settings document
//! on the line holding the XML declaration, followed by one flow-variable
//! declaration per line. Only allow-listed settings keys are emitted; a
//! malformed settings document degrades to a single `parsingerror`
//! parameter and never aborts formatting.

use std::collections::HashSet;

/// Prefix the engine puts before each flow-variable line
pub const FLOW_VARIABLE_PREFIX: &str = "FlowVariable: ";

/// Engine-internal workspace variable, excluded from audit output
pub const RESERVED_WORKSPACE_VARIABLE: &str = "knime.workspace=";

/// Start of the XML declaration the message is cut at
const XML_DECLARATION_START: &str = "<?xml version";

/// Append the `<parameter>` elements for a `PARAMETERS` event to `out`.
///
/// The message is cut at the first XML declaration. Line 0 is the settings
/// document: each `entry` element whose `key` attribute is in
/// `interesting_keys` yields one parameter element. Lines 1..N are
/// flow-variable declarations, emitted minus their prefix, skipping the
/// reserved workspace variable.
pub(crate) fn append_parameters(
    out: &mut String,
    message: &str,
    interesting_keys: &HashSet<String>,
) {
    let Some(start) = message.find(XML_DECLARATION_START) else {
        push_parameter(
            out,
            "parsingerror",
            "nor XML parameters nor flow variables could be parsed",
        );
        return;
    };

    let mut lines = message[start..].lines();
    let settings_line = lines.next().unwrap_or_default();

    match roxmltree::Document::parse(settings_line) {
        Ok(doc) => {
            for entry in doc.descendants().filter(|n| n.has_tag_name("entry")) {
                let key = entry.attribute("key").unwrap_or_default();
                if interesting_keys.contains(key) {
                    push_parameter(out, key, entry.attribute("value").unwrap_or_default());
                }
            }
        }
        Err(err) => {
            tracing::debug!("embedded settings document did not parse: {}", err);
            push_parameter(out, "parsingerror", "XML parameters could not be parsed");
        }
    }

    for line in lines {
        let flow_variable = line.replace(FLOW_VARIABLE_PREFIX, "");
        if !flow_variable.contains(RESERVED_WORKSPACE_VARIABLE) {
            push_parameter(out, "flowvariable", &flow_variable);
        }
    }
}

/// Append one `<parameter name="...">...</parameter>` element.
///
/// Values are embedded verbatim; the document format does not escape them.
fn push_parameter(out: &mut String, name: &str, value: &str) {
    out.push_str("    <parameter name=\"");
    out.push_str(name);
    out.push_str("\">");
    out.push_str(value);
    out.push_str("</parameter>");
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROLOGUE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

    fn keys(list: &[&str]) -> HashSet<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    fn render(message: &str, interesting: &[&str]) -> String {
        let mut out = String::new();
        append_parameters(&mut out, message, &keys(interesting));
        out
    }

    #[test]
    fn test_allow_listed_entries_are_emitted() {
        let message = format!(
            "{}<config><entry key=\"url\" value=\"http://example.org\"/>\
             <entry key=\"password\" value=\"s3cret\"/></config>",
            PROLOGUE
        );
        let out = render(&message, &["url"]);
        assert!(out.contains("<parameter name=\"url\">http://example.org</parameter>"));
        assert!(!out.contains("password"));
        assert!(!out.contains("s3cret"));
    }

    #[test]
    fn test_nested_entries_are_found() {
        let message = format!(
            "{}<config><model><entry key=\"query\" value=\"SELECT 1\"/></model></config>",
            PROLOGUE
        );
        let out = render(&message, &["query"]);
        assert!(out.contains("<parameter name=\"query\">SELECT 1</parameter>"));
    }

    #[test]
    fn test_entry_without_value_attribute_emits_empty_value() {
        let message = format!("{}<config><entry key=\"url\"/></config>", PROLOGUE);
        let out = render(&message, &["url"]);
        assert!(out.contains("<parameter name=\"url\"></parameter>"));
    }

    #[test]
    fn test_no_interesting_keys_emits_no_entry_parameters() {
        let message = format!(
            "{}<config><entry key=\"url\" value=\"http://example.org\"/></config>",
            PROLOGUE
        );
        let out = render(&message, &[]);
        assert!(!out.contains("name=\"url\""));
    }

    #[test]
    fn test_malformed_document_yields_single_parsingerror() {
        let message = format!("{}<config><entry key=\"url\"", PROLOGUE);
        let out = render(&message, &["url"]);
        assert_eq!(out.matches("parsingerror").count(), 1);
        assert!(out.contains(
            "<parameter name=\"parsingerror\">XML parameters could not be parsed</parameter>"
        ));
    }

    #[test]
    fn test_flow_variables_survive_malformed_document() {
        let message = format!("{}<config><broken\nFlowVariable: run=7", PROLOGUE);
        let out = render(&message, &[]);
        assert!(out.contains("<parameter name=\"parsingerror\">"));
        assert!(out.contains("<parameter name=\"flowvariable\">run=7</parameter>"));
    }

    #[test]
    fn test_flow_variable_prefix_is_stripped() {
        let message = format!(
            "{}<config/>\nFlowVariable: customer=acme\nFlowVariable: run=12",
            PROLOGUE
        );
        let out = render(&message, &[]);
        assert!(out.contains("<parameter name=\"flowvariable\">customer=acme</parameter>"));
        assert!(out.contains("<parameter name=\"flowvariable\">run=12</parameter>"));
        assert!(!out.contains("FlowVariable: "));
    }

    #[test]
    fn test_reserved_workspace_variable_is_skipped() {
        let message = format!(
            "{}<config/>\nFlowVariable: knime.workspace=/home/user/workspace\nFlowVariable: run=1",
            PROLOGUE
        );
        let out = render(&message, &[]);
        assert!(!out.contains("workspace"));
        assert!(out.contains("<parameter name=\"flowvariable\">run=1</parameter>"));
    }

    #[test]
    fn test_reserved_workspace_variable_skipped_at_any_position() {
        let message = format!(
            "{}<config/>\nFlowVariable: a=1\nFlowVariable: knime.workspace=/w\nFlowVariable: b=2",
            PROLOGUE
        );
        let out = render(&message, &[]);
        assert!(out.contains(">a=1<"));
        assert!(out.contains(">b=2<"));
        assert!(!out.contains("knime.workspace"));
    }

    #[test]
    fn test_message_without_declaration_yields_parsingerror() {
        let out = render("no declaration in here", &["url"]);
        assert_eq!(
            out,
            "    <parameter name=\"parsingerror\">nor XML parameters nor flow variables could be parsed</parameter>"
        );
    }
}
