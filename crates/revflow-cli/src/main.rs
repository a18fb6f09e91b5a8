//! `revflow` operator CLI.
//!
//! ```text
//! revflow validate  --session <FILE>
//! revflow submit    --session <FILE> --author-name <NAME> --author-email <EMAIL>
//! revflow list      [--workflow <ID>]
//! revflow show      --revision <UUID>
//! revflow compare   --a <UUID> --b <UUID>
//! revflow request   --revision <UUID> --by <NAME>
//! revflow checklist --approval <UUID> --item <ID> (--check | --uncheck) [--by <NAME>]
//! revflow approve   --approval <UUID> --by <NAME>
//! revflow reject    --approval <UUID> --by <NAME> --reason <TXT>
//! revflow events    --revision <UUID>
//! ```
//!
//! Every command except `validate` needs `DATABASE_URL`.
//!
//! Exit codes: 0 ok, 1 invalid artifacts (`validate`), 2 usage, 3 unreadable
//! input, 4 not found / refused transition, 5 storage.

use std::collections::HashMap;
use std::process::exit;

use revflow_core::{classify_error, ApprovalEngine, CoreEngineError, EngineConfig, ErrorClass};
use revflow_domain::{Approval, Author, Revision, WorkflowSession};
use revflow_persistence::{keyed_engine, KvApprovalRepository, KvAuditLog, KvRevisionRepository, PgKeyValueStore,
                          PoolProvider};
use serde::Serialize;
use uuid::Uuid;

type PgStore = PgKeyValueStore<PoolProvider>;
type PgEngine = ApprovalEngine<KvRevisionRepository<PgStore>, KvApprovalRepository<PgStore>, KvAuditLog<PgStore>>;

const USAGE: &str = "usage: revflow <validate|submit|list|show|compare|request|checklist|approve|reject|events> [flags]";

/// Parsed `--flag value` pairs; bare flags map to an empty string.
struct Flags {
    cmd: String,
    values: HashMap<String, String>,
}

impl Flags {
    fn parse(args: &[String]) -> Option<Self> {
        let cmd = args.get(1)?.clone();
        let mut values = HashMap::new();
        let mut i = 2;
        while i < args.len() {
            if let Some(name) = args[i].strip_prefix("--") {
                match args.get(i + 1) {
                    Some(v) if !v.starts_with("--") => {
                        values.insert(name.to_string(), v.clone());
                        i += 1;
                    }
                    _ => {
                        values.insert(name.to_string(), String::new());
                    }
                }
            }
            i += 1;
        }
        Some(Self { cmd, values })
    }

    fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn opt(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    fn req(&self, name: &str) -> &str {
        match self.opt(name) {
            Some(v) => v,
            None => fail(&self.cmd, &format!("missing --{name}\n{USAGE}"), 2),
        }
    }

    fn uuid(&self, name: &str) -> Uuid {
        let raw = self.req(name);
        match Uuid::parse_str(raw) {
            Ok(id) => id,
            Err(e) => fail(&self.cmd, &format!("--{name} is not a UUID ({raw}): {e}"), 2),
        }
    }
}

#[derive(Serialize)]
struct ShowOutput {
    revision: Revision,
    approval: Option<Approval>,
}

fn fail(cmd: &str, msg: &str, code: i32) -> ! {
    eprintln!("[revflow {cmd}] {msg}");
    exit(code)
}

fn exit_code(e: &CoreEngineError) -> i32 {
    match classify_error(e) {
        ErrorClass::NotFound | ErrorClass::Precondition | ErrorClass::Conflict => 4,
        ErrorClass::Storage => 5,
    }
}

fn print_json<T: Serialize>(cmd: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(cmd, &format!("could not render output: {e}"), 5),
    }
}

fn or_exit<T>(cmd: &str, res: Result<T, CoreEngineError>) -> T {
    res.unwrap_or_else(|e| fail(cmd, &format!("error: {e}"), exit_code(&e)))
}

fn read_session(cmd: &str, path: &str) -> WorkflowSession {
    let raw = std::fs::read_to_string(path).unwrap_or_else(|e| fail(cmd, &format!("cannot read {path}: {e}"), 3));
    WorkflowSession::from_json(&raw).unwrap_or_else(|e| fail(cmd, &format!("invalid session {path}: {e}"), 3))
}

fn open_engine(cmd: &str) -> PgEngine {
    if std::env::var("DATABASE_URL").is_err() {
        fail(cmd, "requires DATABASE_URL to reach the persistent store", 4);
    }
    let pool = revflow_persistence::build_dev_pool_from_env().unwrap_or_else(|e| fail(cmd, &format!("pool error: {e}"), 5));
    keyed_engine(PgKeyValueStore::from_pool(pool), EngineConfig::from_env())
}

fn main() {
    // Load .env if present (DATABASE_URL, REVFLOW_*).
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();
    let Some(flags) = Flags::parse(&args) else {
        eprintln!("{USAGE}");
        exit(2);
    };
    let cmd = flags.cmd.as_str();

    match cmd {
        "validate" => {
            let session = read_session(cmd, flags.req("session"));
            let engine = ApprovalEngine::in_memory();
            let results = engine.validate_session(&session);
            print_json(cmd, &results);
            if results.iter().any(|r| !r.valid) {
                exit(1);
            }
        }
        "submit" => {
            let session = read_session(cmd, flags.req("session"));
            let author = Author::new(flags.req("author-name"), flags.req("author-email"))
                .unwrap_or_else(|e| fail(cmd, &format!("invalid author: {e}"), 2));
            let mut engine = open_engine(cmd);
            let revision = or_exit(cmd, engine.submit_session(&session, author));
            println!("revision={} status={} outputs={}",
                     revision.id,
                     revision.status,
                     revision.outputs.len());
        }
        "list" => {
            let engine = open_engine(cmd);
            let revisions = match flags.opt("workflow") {
                Some(wf) => or_exit(cmd, engine.list_revisions_for(wf)),
                None => or_exit(cmd, engine.list_revisions()),
            };
            for r in revisions {
                println!("{}  {}  {:<16}  {}  {}", r.id, r.created_at.to_rfc3339(), r.status.as_str(), r.workflow_id, r.author);
            }
        }
        "show" => {
            let engine = open_engine(cmd);
            let id = flags.uuid("revision");
            let revision = or_exit(cmd, engine.get_revision(id));
            let approval = or_exit(cmd, engine.approval_for_revision(id));
            print_json(cmd, &ShowOutput { revision, approval });
        }
        "compare" => {
            let engine = open_engine(cmd);
            let diff = or_exit(cmd, engine.compare_revisions(flags.uuid("a"), flags.uuid("b")));
            print_json(cmd, &diff);
        }
        "request" => {
            let mut engine = open_engine(cmd);
            let approval = or_exit(cmd, engine.request_approval(flags.uuid("revision"), flags.req("by")));
            println!("approval={} status={}", approval.id, approval.status);
            for g in approval.gates.iter().filter(|g| g.is_blocking()) {
                println!("  gate failing: {} ({})", g.name, g.details.as_deref().unwrap_or("-"));
            }
        }
        "checklist" => {
            let checked = match (flags.has("check"), flags.has("uncheck")) {
                (true, false) => true,
                (false, true) => false,
                _ => fail(cmd, "pass exactly one of --check / --uncheck", 2),
            };
            let mut engine = open_engine(cmd);
            let approval = or_exit(cmd,
                                   engine.update_checklist_item(flags.uuid("approval"),
                                                                flags.req("item"),
                                                                checked,
                                                                flags.opt("by")));
            for item in &approval.checklist {
                let mark = if item.checked { "x" } else { " " };
                let req = if item.required { "*" } else { "" };
                println!("[{mark}] {}{req}  {}", item.id, item.label);
            }
        }
        "approve" => {
            let mut engine = open_engine(cmd);
            let approval = or_exit(cmd, engine.approve(flags.uuid("approval"), flags.req("by")));
            println!("approved: approval={} revision={}", approval.id, approval.revision_id);
        }
        "reject" => {
            let mut engine = open_engine(cmd);
            let approval = or_exit(cmd,
                                   engine.reject(flags.uuid("approval"), flags.req("reason"), flags.req("by")));
            println!("rejected: approval={} revision={}", approval.id, approval.revision_id);
        }
        "events" => {
            let engine = open_engine(cmd);
            for ev in or_exit(cmd, engine.events_for(flags.uuid("revision"))) {
                println!("{:>4}  {}  {}", ev.seq, ev.ts.to_rfc3339(), ev.kind.name());
            }
        }
        _ => fail(cmd, USAGE, 2),
    }
}
