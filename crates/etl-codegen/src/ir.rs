//! Intermediate representation produced by the compiler.

use serde::Serialize;

/// An ordered, possibly nested sequence of instructions.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct InstructionList(pub Vec<Instr>);

impl InstructionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instr: impl Into<Instr>) {
        self.0.push(instr.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instr> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Instr> {
        self.0.get(index)
    }

    /// JSON form, for debugging and golden files.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl FromIterator<Instr> for InstructionList {
    fn from_iter<I: IntoIterator<Item = Instr>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a InstructionList {
    type Item = &'a Instr;
    type IntoIter = std::slice::Iter<'a, Instr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One IR element: a tagged record, a nested list, or a literal leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Instr {
    Special(Special),
    List(InstructionList),
    Number(f64),
    Text(String),
}

impl Instr {
    pub fn as_special(&self) -> Option<&Special> {
        match self {
            Instr::Special(special) => Some(special),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&InstructionList> {
        match self {
            Instr::List(list) => Some(list),
            _ => None,
        }
    }
}

impl From<Special> for Instr {
    fn from(special: Special) -> Self {
        Instr::Special(special)
    }
}

impl From<InstructionList> for Instr {
    fn from(list: InstructionList) -> Self {
        Instr::List(list)
    }
}

/// A compiled language construct. Serializes as a record keyed by its tags,
/// e.g. `{"verb": "write"}` or `{"noun": "game", "prop": {"noun": "name"}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Special {
    Verb {
        verb: String,
    },
    Iexpr {
        iexpr: InstructionList,
    },
    /// Also used for `it`, with `noun: "it"`.
    Noun {
        noun: String,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        ty: Option<Box<Special>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        prop: Option<Box<Special>>,
    },
    /// `[base, op, term, op, term, ...]` in source order, each operator as
    /// its symbol text.
    Math {
        math: InstructionList,
    },
    Struct {
        #[serde(rename = "struct")]
        name: String,
    },
    /// Builtin type keyword.
    Bit {
        bit: String,
    },
    /// Struct type; wraps a [`Special::Struct`].
    Srt {
        srt: Box<Special>,
    },
    Comment {
        comment: String,
    },
    Create {
        create: Box<Special>,
        #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
        value: Option<Box<Instr>>,
    },
    Assign {
        from: Box<Special>,
        to: Box<Instr>,
    },
}

impl Special {
    /// Tag keys and values in rendering order, skipping absent entries.
    pub fn entries(&self) -> Vec<(&'static str, Entry<'_>)> {
        match self {
            Special::Verb { verb } => vec![("verb", Entry::Str(verb))],
            Special::Iexpr { iexpr } => vec![("iexpr", Entry::List(iexpr))],
            Special::Noun { noun, ty, prop } => {
                let mut entries = vec![("noun", Entry::Str(noun))];
                if let Some(ty) = ty {
                    entries.push(("type", Entry::Special(ty)));
                }
                if let Some(prop) = prop {
                    entries.push(("prop", Entry::Special(prop)));
                }
                entries
            }
            Special::Math { math } => vec![("math", Entry::List(math))],
            Special::Struct { name } => vec![("struct", Entry::Str(name))],
            Special::Bit { bit } => vec![("bit", Entry::Str(bit))],
            Special::Srt { srt } => vec![("srt", Entry::Special(srt))],
            Special::Comment { comment } => vec![("comment", Entry::Str(comment))],
            Special::Create { create, value } => {
                let mut entries = vec![("create", Entry::Special(create))];
                if let Some(value) = value {
                    entries.push(("as", Entry::Instr(value)));
                }
                entries
            }
            Special::Assign { from, to } => {
                vec![("from", Entry::Special(from)), ("to", Entry::Instr(to))]
            }
        }
    }
}

/// A borrowed view of one tagged entry's value.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Str(&'a str),
    Special(&'a Special),
    Instr(&'a Instr),
    List(&'a InstructionList),
}
