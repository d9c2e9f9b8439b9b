// Pipeline module declarations
// Each phase is a separate module for clean separation

pub mod glossary; // Phase 1: Load the glossary for prompt context
pub mod analyze;  // Phase 2: LLM classification per description
pub mod batch;    // Phase 3: CSV iteration, merge, and output
