use crate::schema::ArtifactKind;

/// Instruction framing the model as a teacher producing one artifact kind
pub fn system_prompt(kind: ArtifactKind) -> String {
    let mut prompt = String::from("You are a teacher. Your job is to create a ");
    prompt.push_str(match kind {
        ArtifactKind::Flashcards => "set of flashcards (term and definition), exactly 10 flashcards ",
        ArtifactKind::MatchingGame => "matching game exercise (8 pair terms with definitions) ",
        ArtifactKind::Quiz => "multiple choice quiz (4 questions, each with 4 options) ",
    });
    prompt.push_str("based on the content of the document.");

    if let Some(schema) = kind.schema_text() {
        prompt.push_str(
            "\n\nRespond with a single JSON array and nothing else. It must satisfy this JSON Schema:\n",
        );
        prompt.push_str(schema);
    }
    prompt
}

pub fn user_prompt(kind: ArtifactKind) -> String {
    let noun = match kind {
        ArtifactKind::Flashcards => "flashcards",
        ArtifactKind::Quiz => "quiz",
        ArtifactKind::MatchingGame => "Matching game",
    };
    format!("Create a {noun} based on this document.")
}
