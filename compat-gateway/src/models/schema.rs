//! Where each resource lives in the document store.

use super::{CollectionPath, DocumentPath};

pub fn apps() -> CollectionPath {
    CollectionPath::root("apps")
}

pub fn app(app_id: &str) -> DocumentPath {
    apps().doc(app_id)
}

pub fn agents(app_id: &str) -> CollectionPath {
    app(app_id).collection("agents")
}

pub fn conversations(app_id: &str, agent_id: &str) -> CollectionPath {
    agents(app_id).doc(agent_id).collection("conversations")
}

pub fn messages(app_id: &str, agent_id: &str, conversation_id: &str) -> CollectionPath {
    conversations(app_id, agent_id)
        .doc(conversation_id)
        .collection("messages")
}

/// Items of a caller-named entity namespace
pub fn entity_items(app_id: &str, entity_name: &str) -> CollectionPath {
    app(app_id)
        .collection("entities")
        .doc(entity_name)
        .collection("items")
}

pub fn invites(app_id: &str) -> CollectionPath {
    app(app_id).collection("invites")
}

/// Stub user bucket written on signup
pub fn users() -> CollectionPath {
    CollectionPath::root("_global").doc("users").collection("items")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_paths() {
        assert_eq!(
            messages("a", "g", "c").as_str(),
            "apps/a/agents/g/conversations/c/messages"
        );
        assert_eq!(entity_items("a", "Task").as_str(), "apps/a/entities/Task/items");
        assert_eq!(invites("a").as_str(), "apps/a/invites");
        assert_eq!(users().as_str(), "_global/users/items");
    }
}
