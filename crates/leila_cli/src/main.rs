//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive the core end to end against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use leila_core::{
    open_store, serialize_articles, AppContext, EmailNotifier, Notifier, SmsNotifier, StoreConfig,
};
use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("leila: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("leila_core version={}", leila_core::core_version());

    let conn = open_store(&StoreConfig::default())?;
    let email = Rc::new(EmailNotifier::new());
    let sms = Rc::new(SmsNotifier::new());
    let notifiers: Vec<Rc<dyn Notifier>> = vec![email.clone(), sms.clone()];
    let mut ctx = AppContext::with_notifiers(&conn, notifiers);

    let history = ctx.add_category("history", None)?;
    let history_id = history.borrow().id();
    let greece = ctx.add_category("greece", Some(history_id))?;
    let greece_id = greece.borrow().id();
    ctx.add_article(greece_id, "approved", "marathon")?;
    ctx.add_article(history_id, "unapproved", "chronology")?;

    ctx.register_reader("Alice")?;
    ctx.register_reader("Bob")?;
    ctx.subscribe("marathon", "Alice")?;
    let notified = ctx.subscribe("marathon", "Bob")?;
    ctx.engine.copy_article("marathon");

    for reader in ctx.stored_readers()? {
        let reader = reader.borrow();
        println!("reader id={:?} name={}", reader.id, reader.name);
    }
    println!(
        "notified={notified} email_sent={} sms_sent={}",
        email.sent().len(),
        sms.sent().len()
    );
    println!("articles={}", serialize_articles(ctx.engine.articles())?);
    Ok(())
}
