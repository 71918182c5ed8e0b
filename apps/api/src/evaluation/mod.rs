// Candidate evaluation: classify the résumé against the offer, interview the
// candidate about what the résumé leaves open, audit the transcript.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod classifier;
pub mod handlers;
pub mod llm_classifier;
pub mod machine;
pub mod prompts;
pub mod rules;

#[cfg(test)]
pub mod testing;
