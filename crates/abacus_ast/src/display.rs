//! Human-facing rendering of ref sequences.
//!
//! Unlike [`Store::symbol`], which keeps composites opaque as `?k`, the
//! display adapters expand composites to their children so a final state
//! reads like the expression it denotes: `5 + x + 6 * y`, `x^5`. Tokens
//! are space-separated except around `^`, and parenthesized groups render
//! tight.

use std::fmt;

use crate::expression::{OpKind, Ref, RefId, Store};

/// Renders one ref, composites expanded.
pub struct DisplayRef<'a> {
    pub store: &'a Store,
    pub id: RefId,
}

/// Renders a whole flattened sequence, composites expanded.
pub struct DisplaySeq<'a> {
    pub store: &'a Store,
    pub refs: &'a [RefId],
}

impl fmt::Display for DisplayRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();
        push_tokens(self.store, self.id, &mut tokens);
        f.write_str(&join_tokens(&tokens))
    }
}

impl fmt::Display for DisplaySeq<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();
        for &id in self.refs {
            push_tokens(self.store, id, &mut tokens);
        }
        f.write_str(&join_tokens(&tokens))
    }
}

fn push_tokens(store: &Store, id: RefId, out: &mut Vec<String>) {
    match store.get(id) {
        Ref::Number(n) => out.push(n.to_string()),
        Ref::Variable(name) => out.push(name.clone()),
        Ref::Op(op) => out.push(op.as_char().to_string()),
        Ref::Composite { children, .. } => {
            // A parenthesized group becomes a single tight token.
            let parenthesized = children.first().map(|&c| store.get(c))
                == Some(&Ref::Op(OpKind::LParen));
            if parenthesized && children.len() >= 2 {
                let mut inner = Vec::new();
                for &child in &children[1..children.len() - 1] {
                    push_tokens(store, child, &mut inner);
                }
                out.push(format!("({})", join_tokens(&inner)));
            } else {
                for &child in children {
                    push_tokens(store, child, out);
                }
            }
        }
    }
}

fn join_tokens(tokens: &[String]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token != "^" && tokens[i - 1] != "^" {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}
