//! Parse draft text with PEST: message block extraction and field declarations.

use crate::ast::Block;
use crate::error::GenError;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct DraftParser;

/// Syntax of one field declaration, before type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Label with internal whitespace collapsed to single spaces.
    pub label: String,
    pub spec_type: String,
    pub default_value: Option<String>,
    /// Declaration starts with `[`.
    pub opens_group: bool,
    /// Declaration ends with `]`.
    pub closes_group: bool,
    /// Trailing `...`.
    pub repeated: bool,
    /// Type token is the literal `..`.
    pub variable_length: bool,
}

/// Split draft text into `Name Message { ... }` blocks, in document order.
///
/// Headers are found anywhere in the text. Only a header that starts its line may
/// carry a multi-word name. Blocks cannot contain nested braces: the first `}`
/// closes the block.
pub fn extract_blocks(text: &str) -> Result<impl Iterator<Item = Block<'_>> + '_, GenError> {
    let document = DraftParser::parse(Rule::document, text)
        .map_err(|e| GenError::Grammar(format!("Parse error: {}", e)))?
        .next()
        .ok_or_else(|| GenError::Grammar("Empty parse".to_string()))?;
    Ok(document
        .into_inner()
        .filter(|pair| matches!(pair.as_rule(), Rule::block | Rule::inline_block))
        .filter_map(build_block))
}

fn build_block(pair: pest::iterators::Pair<'_, Rule>) -> Option<Block<'_>> {
    let line = pair.as_span().start_pos().line_col().0;
    let mut name = None;
    let mut body = "";
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::block_name | Rule::block_word => name = Some(inner.as_str()),
            Rule::block_body => body = inner.as_str(),
            _ => {}
        }
    }
    Some(Block {
        name: name?,
        body,
        line,
    })
}

/// Drop a trailing `#` comment, surrounding whitespace and trailing commas.
pub fn strip_comment(line: &str) -> &str {
    let code = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    };
    code.trim().trim_end_matches(',').trim_end()
}

/// Split one physical line into declarations at commas outside parentheses.
pub fn split_declarations(line: &str) -> Vec<&str> {
    let line = strip_comment(line);
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(line[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(line[start..].trim());
    out.retain(|d| !d.is_empty());
    out
}

/// Parse one declaration: `[ Name (type) = default ... ]`.
///
/// Returns `None` for anything that does not match the grammar, including empty
/// and comment-only input. Text after the recognised prefix is ignored.
pub fn parse_field_decl(decl: &str) -> Option<FieldDecl> {
    let decl = strip_comment(decl);
    if decl.is_empty() {
        return None;
    }
    let pair = DraftParser::parse(Rule::field_decl, decl).ok()?.next()?;

    let mut label = String::new();
    let mut spec_type = String::new();
    let mut default_value = None;
    let mut opens_group = false;
    let mut closes_group = false;
    let mut repeated = false;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::open_bracket => opens_group = true,
            Rule::field_name => {
                label = inner.as_str().split_whitespace().collect::<Vec<_>>().join(" ")
            }
            Rule::type_token => spec_type = inner.as_str().trim().to_string(),
            Rule::default_value => {
                let v = inner.as_str().trim();
                if !v.is_empty() {
                    default_value = Some(v.to_string());
                }
            }
            Rule::repeat_marker => repeated = true,
            Rule::close_bracket => closes_group = true,
            _ => {}
        }
    }
    if label.is_empty() || spec_type.is_empty() {
        return None;
    }
    let variable_length = spec_type == "..";
    Some(FieldDecl {
        label,
        spec_type,
        default_value,
        opens_group,
        closes_group,
        repeated,
        variable_length,
    })
}
