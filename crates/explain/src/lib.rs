//! Summary rendering for ranked fixture configurations.
//!
//! Produces the minimal one-line-per-candidate summary that travels with
//! the ranked list. The full natural-language explanation is a downstream
//! renderer's responsibility; this crate only guarantees that renderer
//! never receives an empty string for an empty list.

use luxrec_model::CandidateConfiguration;

/// Fallback text when the ranked list is empty, so downstream renderers
/// can show a "refine your request" message instead of empty output.
pub const NO_CANDIDATES_FALLBACK: &str =
    "No fixture configurations matched the request; refine the room constraints and try again.";

/// One-line summary of a single candidate.
pub fn summary_line(candidate: &CandidateConfiguration) -> String {
    format!(
        "{} {} ({}): {} pcs, ~{:.1} lx ({}), cost {:.2} ({:.1}% of budget)",
        candidate.fixture.brand,
        candidate.fixture.fixture_type,
        candidate.fixture.series,
        candidate.required_fixture_count,
        candidate.achieved_illuminance_lux,
        candidate.illumination_level.label(),
        candidate.total_cost,
        candidate.budget_fraction_pct,
    )
}

/// Summary block for a ranked shortlist, one line per candidate.
pub fn summarize(ranked: &[CandidateConfiguration]) -> String {
    if ranked.is_empty() {
        return NO_CANDIDATES_FALLBACK.to_string();
    }

    ranked
        .iter()
        .map(summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}
