//! End-to-end demo: two sessions of the same workflow are validated,
//! snapshotted, compared and taken through an approval round each (one
//! approved, one rejected). Runs in memory unless built with `pg_demo`.

use revflow_core::constants::ITEM_ACCESSIBILITY_REVIEWED;
use revflow_core::{ApprovalEngine, ApprovalRepository, AuditLog, CoreEngineError, EngineConfig, InMemoryApprovalRepository,
                   InMemoryRevisionRepository, RevisionRepository};
use revflow_domain::{Author, GeneratedArtifact, WorkflowSession};

fn session(id: &str, layer: &str, testid: &str) -> WorkflowSession {
    let compose = format!(r#"{{"componentName":"PricingCard","layer":"{layer}","props":{{"price":{{"type":"number"}},"label":{{}}}}}}"#);
    let testids = format!(r#"{{"card":{{"root":"pr-pricing-card","cta":"{testid}"}}}}"#);
    WorkflowSession::new(id, "wf-pricing-card")
        .with_step_input("describe", serde_json::json!({ "prompt": "pricing card with CTA" }))
        .with_artifact(GeneratedArtifact::new("compose", "json", "components/COMPOSE_PricingCard.json").with_content(compose))
        .with_artifact(GeneratedArtifact::new("testids", "json", "components/TESTIDS_pricing_card.json").with_content(testids))
        .with_artifact(GeneratedArtifact::new("section", "markdown", "docs/SECTION_pricing.md")
            .with_content("# Pricing\n\nCard with a call to action.\n"))
}

fn run<R, A, L>(mut engine: ApprovalEngine<R, A, L>) -> Result<(), CoreEngineError>
    where R: RevisionRepository,
          A: ApprovalRepository,
          L: AuditLog
{
    let author = Author::new("Demo User", "demo@example.com").map_err(|e| CoreEngineError::Internal(e.to_string()))?;

    let first = engine.submit_session(&session("s-1", "blocks", "pr-pricing-card-cta"), author.clone())?;
    println!("revision {} created: valid={} fingerprint={}", first.id, first.is_valid(), first.fingerprint);
    for r in &first.validation_results {
        println!("  {:<40} schema={:<8} errors={} warnings={}", r.artifact_path, r.schema, r.errors.len(), r.warnings.len());
    }

    let approval = engine.request_approval(first.id, "demo")?;
    println!("approval {} requested", approval.id);
    for g in &approval.gates {
        println!("  gate {:<20} {:?}  {}", g.id, g.status, g.details.as_deref().unwrap_or(""));
    }
    match engine.approve(approval.id, "lead") {
        Err(e) => println!("approve refused: {e}"),
        Ok(_) => println!("approved without review?"),
    }
    engine.update_checklist_item(approval.id, ITEM_ACCESSIBILITY_REVIEWED, true, Some("a11y-reviewer"))?;
    let approved = engine.approve(approval.id, "lead")?;
    println!("approval {} -> {}", approved.id, approved.status);

    // Second session: layer changed and a malformed test id.
    let second = engine.submit_session(&session("s-2", "templates", "PricingCTA"), author)?;
    let diff = engine.compare_revisions(first.id, second.id)?;
    println!("diff {} -> {}: +{} -{} ~{}",
             first.id,
             second.id,
             diff.added.len(),
             diff.removed.len(),
             diff.modified.len());
    for m in &diff.modified {
        println!("  modified {}", m.artifact.path);
    }
    let approval = engine.request_approval(second.id, "demo")?;
    let rejected = engine.reject(approval.id, "test ids do not follow the naming convention", "lead")?;
    println!("approval {} -> {} ({})",
             rejected.id,
             rejected.status,
             rejected.rejection_reason.as_deref().unwrap_or(""));

    for rev in engine.list_revisions_for("wf-pricing-card")? {
        println!("revision {} {} events={}", rev.id, rev.status, engine.events_for(rev.id)?.len());
    }
    Ok(())
}

#[cfg(not(feature = "pg_demo"))]
fn main() {
    let engine = ApprovalEngine::builder(InMemoryRevisionRepository::new(), InMemoryApprovalRepository::new())
        .config(EngineConfig::from_env())
        .build();
    if let Err(e) = run(engine) {
        eprintln!("demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(feature = "pg_demo")]
fn main() {
    let _ = dotenvy::dotenv();
    let pool = match revflow_persistence::build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("pool error: {e}");
            std::process::exit(5);
        }
    };
    let store = revflow_persistence::PgKeyValueStore::from_pool(pool);
    if let Err(e) = run(revflow_persistence::keyed_engine(store, EngineConfig::from_env())) {
        eprintln!("demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_demo_runs() {
        let engine = ApprovalEngine::builder(InMemoryRevisionRepository::new(), InMemoryApprovalRepository::new()).build();
        run(engine).unwrap();
    }
}
