// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Evidence rule shared by every classification prompt.
pub const EVIDENCE_INSTRUCTION: &str = "\
    CRITICAL: Classify a requirement as matching ONLY on explicit positive evidence, \
    and as unmatching ONLY on explicit negative evidence \
    (e.g. the offer asks for 5 years and the text says 1 year, or the candidate says they know nothing about it). \
    If a requirement is not mentioned it is not_found. \
    NEVER infer that the candidate lacks something because it is not mentioned. \
    When in doubt, ALWAYS use not_found.";
