use strata_core::Depth;

/// Length guidance placed at the top of every prompt.
pub fn depth_instructions(depth: Depth) -> &'static str {
    match depth {
        Depth::Standard => {
            "Generate a focused test strategy with 200-400 words per major section. \
             Prioritize key strategic decisions and concrete recommendations. \
             Total document length: approximately 3,000-5,000 words."
        }
        Depth::Detailed => {
            "Generate a comprehensive test strategy with 400-700 words per major section. \
             Include specific tool recommendations, metrics with targets and concrete examples. \
             Total document length: approximately 5,000-8,000 words."
        }
        Depth::Comprehensive => {
            "Generate an exhaustive enterprise-grade test strategy with 600-1000 words per major section. \
             Include detailed tables, RACI matrices, risk registers with scoring, complete metric \
             definitions and phased rollout plans. \
             Total document length: approximately 8,000-12,000 words."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_depth_names_its_word_range() {
        assert!(depth_instructions(Depth::Standard).contains("3,000-5,000"));
        assert!(depth_instructions(Depth::Detailed).contains("400-700"));
        assert!(depth_instructions(Depth::Comprehensive).contains("8,000-12,000"));
    }
}
