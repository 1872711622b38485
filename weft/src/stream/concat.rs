//! Merge streamed fragments into one message.

use std::collections::BTreeMap;

use crate::message::{Message, Role, ToolCall};

use super::{MessageChunk, ToolCallChunk};

/// Concatenates fragments of one message in delivery order.
///
/// - Text content is appended in order.
/// - Tool call pieces with the same `index` merge into one call: `id`, `kind` and
///   `name` take the first non-empty value seen, `arguments` are appended in arrival
///   order. Pieces without an index are kept as separate calls and come first;
///   indexed calls follow in index order.
/// - The role comes from the first fragment; a `Tool` role yields a tool message
///   with the first non-empty `tool_call_id`.
pub fn concat_chunks(chunks: &[MessageChunk]) -> Message {
    let role = chunks.first().map(|c| c.role).unwrap_or_default();
    let mut content = String::new();
    let mut tool_call_id: Option<String> = None;
    let mut unindexed: Vec<ToolCall> = Vec::new();
    let mut indexed: BTreeMap<usize, ToolCall> = BTreeMap::new();

    for chunk in chunks {
        content.push_str(&chunk.content);
        if tool_call_id.is_none() {
            tool_call_id = chunk.tool_call_id.clone().filter(|id| !id.is_empty());
        }
        for part in &chunk.tool_calls {
            match part.index {
                Some(index) => merge_part(indexed.entry(index).or_default(), part),
                None => {
                    let mut call = ToolCall::default();
                    merge_part(&mut call, part);
                    unindexed.push(call);
                }
            }
        }
    }

    match role {
        Role::System => Message::System { content },
        Role::User => Message::User { content },
        Role::Tool => Message::Tool {
            tool_call_id: tool_call_id.unwrap_or_default(),
            content,
        },
        Role::Assistant => {
            unindexed.extend(indexed.into_values());
            Message::Assistant {
                content,
                tool_calls: unindexed,
            }
        }
    }
}

fn merge_part(call: &mut ToolCall, part: &ToolCallChunk) {
    if call.id.is_empty() {
        call.id = part.id.clone();
    }
    if call.kind.is_empty() {
        call.kind = part.kind.clone();
    }
    if call.name.is_empty() {
        call.name = part.name.clone();
    }
    call.arguments.push_str(&part.arguments);
}
