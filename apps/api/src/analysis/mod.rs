// Resume analysis: the stage pipeline, its collaborator contracts, the
// persisted record and the status stream.
// No module here talks to S3, Redis or the LLM directly; see crate::adapters.

pub mod collaborators;
pub mod orchestrator;
pub mod prompts;
pub mod record;
pub mod status;
