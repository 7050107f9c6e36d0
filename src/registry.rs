use std::fmt;

use tracing::debug;

/// Identifier of a token inside a single field. Ids start at 1 and are never
/// handed out twice by the same registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(u32);

impl TokenId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub label: String,
    pub list_ref: Option<String>,
    /// Chosen options in the order they were picked, without duplicates.
    pub selected_options: Vec<String>,
}

impl Token {
    fn new(id: TokenId) -> Self {
        Self {
            id,
            label: default_label(id),
            list_ref: None,
            selected_options: Vec::new(),
        }
    }
}

pub fn default_label(id: TokenId) -> String {
    format!("List{}", id.get())
}

/// Live tokens of one field.
#[derive(Clone, Debug)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
    next_id: u32,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            next_id: 1,
        }
    }
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self) -> TokenId {
        let id = TokenId(self.next_id);
        self.next_id += 1;
        self.tokens.push(Token::new(id));
        debug!(token = %id, "token created");
        id
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|token| token.id == id)
    }

    fn get_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|token| token.id == id)
    }

    pub fn rename(&mut self, id: TokenId, label: impl Into<String>) {
        if let Some(token) = self.get_mut(id) {
            token.label = label.into();
        }
    }

    /// Attaching a list resets any previously chosen options.
    pub fn attach_list(&mut self, id: TokenId, list_title: impl Into<String>) {
        if let Some(token) = self.get_mut(id) {
            token.list_ref = Some(list_title.into());
            token.selected_options.clear();
        }
    }

    pub fn set_options<I, S>(&mut self, id: TokenId, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(token) = self.get_mut(id) else {
            return;
        };
        token.selected_options.clear();
        for option in options {
            let option = option.into();
            if !token.selected_options.contains(&option) {
                token.selected_options.push(option);
            }
        }
    }

    pub fn remove(&mut self, id: TokenId) -> Option<Token> {
        let index = self.tokens.iter().position(|token| token.id == id)?;
        debug!(token = %id, "token removed");
        Some(self.tokens.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Token> {
        self.tokens.clone()
    }

    /// Replaces the live entries. The id counter only ever moves forward, so
    /// restoring an older snapshot never makes an id available again.
    pub fn restore(&mut self, tokens: Vec<Token>) {
        if let Some(max) = tokens.iter().map(|token| token.id.get()).max() {
            self.next_id = self.next_id.max(max + 1);
        }
        self.tokens = tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut registry = TokenRegistry::new();
        assert_eq!(registry.create(), TokenId::new(1));
        assert_eq!(registry.create(), TokenId::new(2));
        assert_eq!(registry.get(TokenId::new(1)).unwrap().label, "List1");
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut registry = TokenRegistry::new();
        let first = registry.create();
        registry.create();
        assert!(registry.remove(first).is_some());
        assert_eq!(registry.create(), TokenId::new(3));
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn mutations_on_missing_ids_are_ignored() {
        let mut registry = TokenRegistry::new();
        let missing = TokenId::new(9);
        registry.rename(missing, "Ghost");
        registry.attach_list(missing, "Colors");
        registry.set_options(missing, ["Red"]);
        assert!(registry.remove(missing).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn attach_list_clears_previous_options() {
        let mut registry = TokenRegistry::new();
        let id = registry.create();
        registry.attach_list(id, "Colors");
        registry.set_options(id, ["Red", "Green"]);
        registry.attach_list(id, "Sizes");

        let token = registry.get(id).unwrap();
        assert_eq!(token.list_ref.as_deref(), Some("Sizes"));
        assert!(token.selected_options.is_empty());
    }

    #[test]
    fn set_options_keeps_first_occurrence_order() {
        let mut registry = TokenRegistry::new();
        let id = registry.create();
        registry.set_options(id, ["b", "a", "b", "c"]);
        assert_eq!(registry.get(id).unwrap().selected_options, ["b", "a", "c"]);
    }

    #[test]
    fn restore_does_not_rewind_the_counter() {
        let mut registry = TokenRegistry::new();
        let before = registry.snapshot();
        registry.create();
        registry.create();
        registry.restore(before);
        assert!(registry.is_empty());
        assert_eq!(registry.create(), TokenId::new(3));
    }

    proptest! {
        #[test]
        fn created_ids_are_strictly_increasing(ops in proptest::collection::vec(any::<bool>(), 1..64)) {
            let mut registry = TokenRegistry::new();
            let mut issued: Vec<TokenId> = Vec::new();
            for create in ops {
                if create || issued.is_empty() {
                    issued.push(registry.create());
                } else {
                    let victim = issued[issued.len() / 2];
                    registry.remove(victim);
                }
            }
            prop_assert_eq!(issued[0], TokenId::new(1));
            for pair in issued.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
