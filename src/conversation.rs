//! The running conversation.

use crate::types::Message;

/// An ordered, append-only history of messages.
///
/// Insertion order is turn order, and [`Conversation::get_messages`] hands the history back in
/// exactly that order.  No role discipline is enforced: two system messages in a row are as
/// welcome as a user followed by an assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a conversation whose first message is the given system prompt.
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.add_message(Message::system(prompt));
        conversation
    }

    /// Appends a message.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns the full history, oldest first.
    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Iterates the history, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no message has been added.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Extend<Message> for Conversation {
    fn extend<T: IntoIterator<Item = Message>>(&mut self, iter: T) {
        for message in iter {
            self.add_message(message);
        }
    }
}

impl FromIterator<Message> for Conversation {
    fn from_iter<T: IntoIterator<Item = Message>>(iter: T) -> Self {
        let mut conversation = Self::new();
        conversation.extend(iter);
        conversation
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn new_conversation_empty() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert_eq!(conversation.len(), 0);
        assert!(conversation.last().is_none());
    }

    #[test]
    fn messages_come_back_in_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.add_message(Message::system("one"));
        conversation.add_message(Message::system("two"));
        conversation.add_message(Message::user("three"));
        conversation.add_message(Message::user("four"));
        conversation.add_message(Message::ai("five"));

        let contents: Vec<&str> = conversation
            .get_messages()
            .iter()
            .map(Message::content)
            .collect();
        assert_eq!(contents, vec!["one", "two", "three", "four", "five"]);

        let roles: Vec<Role> = conversation.iter().map(Message::role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::System, Role::User, Role::User, Role::Ai]
        );
    }

    #[test]
    fn system_prompt_goes_first() {
        let mut conversation = Conversation::with_system_prompt("Be brief.");
        conversation.add_message(Message::user("Hi"));
        assert_eq!(conversation.get_messages()[0], Message::system("Be brief."));
        assert_eq!(conversation.last(), Some(&Message::user("Hi")));
    }

    #[test]
    fn copies_do_not_alias() {
        let mut conversation = Conversation::with_system_prompt("s");
        let mut snapshot = conversation.get_messages().to_vec();
        snapshot.push(Message::user("not in the conversation"));
        assert_eq!(conversation.len(), 1);

        conversation.add_message(Message::user("u"));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn collect_and_extend() {
        let mut conversation: Conversation =
            vec![Message::system("s"), Message::user("u")].into_iter().collect();
        conversation.extend([Message::ai("a")]);
        assert_eq!(conversation.len(), 3);
        assert_eq!((&conversation).into_iter().count(), 3);
    }
}
