// reconcile/src/commands/review.rs
//
// USE CASE: Interactive review of one batch, driven from stdin.

use std::io::{self, Write};
use std::path::PathBuf;

use reconcile_core::domain::decision::{Choice, DecisionDraft, DecisionRecord};
use reconcile_core::domain::session::{CurrentItem, Phase, SessionSummary};

use super::backend::Backend;
use super::output::table;

const CARD_HELP: &str = "\
  <enter>        accept the recommended option (★)
  <n>            pick option n
  = <text>       use a custom value
  r              toggle 'create a rule' for this decision
  range <a> <b>  override the accepted range ('-' leaves a bound open)
  s              skip this incongruence
  q              cancel the whole review";

const FINAL_HELP: &str = "\
  a              apply the decisions to the batch
  e              export the decisions as JSON (nothing is applied)
  m <n>          revise decision #n
  q              cancel and discard every decision";

#[derive(Debug, Clone, PartialEq)]
pub enum CardInput {
    Choose(Choice),
    ToggleRule,
    Range(Option<f64>, Option<f64>),
    Skip,
    Cancel,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FinalInput {
    Apply,
    Export,
    Modify(u32),
    Cancel,
    Help,
}

pub fn parse_card_input(line: &str) -> Result<CardInput, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(CardInput::Choose(Choice::Favorite));
    }
    if let Some(text) = line.strip_prefix('=') {
        return Ok(CardInput::Choose(Choice::Custom(text.trim().to_string())));
    }
    if let Ok(n) = line.parse::<usize>() {
        return match n {
            0 => Err("options are numbered from 1".into()),
            n => Ok(CardInput::Choose(Choice::Option(n - 1))),
        };
    }

    let mut words = line.split_whitespace();
    match words.next().map(str::to_lowercase).as_deref() {
        Some("r" | "rule") => Ok(CardInput::ToggleRule),
        Some("s" | "skip") => Ok(CardInput::Skip),
        Some("q" | "cancel") => Ok(CardInput::Cancel),
        Some("?" | "h" | "help") => Ok(CardInput::Help),
        Some("range") => {
            let min = parse_bound(words.next())?;
            let max = parse_bound(words.next())?;
            Ok(CardInput::Range(min, max))
        }
        _ => Err(format!("unknown input '{}' (type ? for help)", line)),
    }
}

fn parse_bound(word: Option<&str>) -> Result<Option<f64>, String> {
    match word {
        None | Some("-") => Ok(None),
        Some(w) => w
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("'{}' is not a number", w)),
    }
}

pub fn parse_final_input(line: &str) -> Result<FinalInput, String> {
    let mut words = line.split_whitespace();
    match words.next().map(str::to_lowercase).as_deref() {
        Some("a" | "apply") => Ok(FinalInput::Apply),
        Some("e" | "export") => Ok(FinalInput::Export),
        Some("q" | "cancel") => Ok(FinalInput::Cancel),
        Some("?" | "h" | "help") | None => Ok(FinalInput::Help),
        Some("m" | "modify") => words
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .map(FinalInput::Modify)
            .ok_or_else(|| "usage: m <decision number>".to_string()),
        Some(other) => Err(format!("unknown input '{}' (type ? for help)", other)),
    }
}

pub fn render_card(item: &CurrentItem<'_>, draft_rule: bool) -> String {
    let inc = item.incongruence;
    let mut lines = vec![format!(
        "\n🧩 [{}/{}] {} in '{}'",
        item.position,
        item.total,
        inc.kind().label(),
        inc.field().unwrap_or("-")
    )];

    if let Some(impact) = inc.impact() {
        lines.push(format!(
            "   Impact: {} of {} records ({:.1}%)",
            impact.affected_count(),
            impact.total_count(),
            impact.percentage()
        ));
    } else if let Some(count) = inc.count() {
        lines.push(format!("   Occurrences: {}", count));
    }
    if let Some(range) = inc.kind().current_range() {
        lines.push(format!("   Current range: {} .. {}", range.min, range.max));
    }
    if !inc.sample().is_empty() {
        let sample: Vec<String> = inc.sample().iter().map(|v| v.to_string()).collect();
        lines.push(format!("   Examples: {}", sample.join(", ")));
    }

    let mut options = table(&["#", "Option", "Frequency", "Description"]);
    for (i, option) in inc.options().iter().enumerate() {
        let marker = if option.is_favorite { " ★" } else { "" };
        options.add_row(vec![
            format!("{}{}", i + 1, marker),
            option.value.clone(),
            option
                .frequency
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".into()),
            option.description.clone().unwrap_or_default(),
        ]);
    }
    lines.push(options.to_string());

    if draft_rule {
        lines.push("   📏 A rule will be created from this decision".into());
    }
    lines.join("\n")
}

pub fn render_decisions(records: &[DecisionRecord], summary: &SessionSummary) -> String {
    let mut out = table(&["#", "Kind", "Field", "Action", "Value", "Rule"]);
    for record in records {
        let decision = &record.decision;
        out.add_row(vec![
            record.sequence_number.to_string(),
            record.incongruence.kind().label().to_string(),
            decision.field().unwrap_or("-").to_string(),
            decision.action().to_string(),
            decision.value().unwrap_or("-").to_string(),
            if decision.create_rule() { "yes" } else { "" }.to_string(),
        ]);
    }

    let tallies: Vec<String> = summary
        .by_action
        .iter()
        .map(|(action, n)| format!("{} {}", n, action))
        .collect();
    format!(
        "\n📋 {} decision(s), {} rule(s) to create [{}]\n{}",
        summary.decisions,
        summary.rules_flagged,
        tallies.join(", "),
        out
    )
}

/// `None` on end of input.
fn prompt(label: &str) -> anyhow::Result<Option<String>> {
    print!("{} ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N]", question))?.unwrap_or_default();
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn execute(project_dir: PathBuf, batch: String) -> anyhow::Result<()> {
    let backend = Backend::connect(&project_dir)?;
    let wizard = backend.wizard();

    println!("🔎 Analyzing '{}'...", batch);
    wizard.select_batch(&batch).await?;

    if wizard.phase()? == Phase::Idle {
        let notice = wizard.inspect(|s| s.notice().map(str::to_string))?;
        println!("✨ {}", notice.unwrap_or_else(|| "Nothing to review".into()));
        return Ok(());
    }
    let found = wizard.inspect(|s| s.incongruences().len())?;
    println!("⚠️  {} incongruence(s) to review. Type ? for help.", found);

    let mut draft = DecisionDraft::default();
    loop {
        match wizard.phase()? {
            Phase::Reviewing | Phase::Revising(_) => {
                let rule = draft.create_rule;
                let card = wizard.inspect(|s| s.current().map(|c| render_card(&c, rule)))?;
                println!("{}", card.unwrap_or_default());

                let Some(line) = prompt("➜")? else {
                    println!("\n🚪 Input closed, nothing applied.");
                    return Ok(());
                };
                match parse_card_input(&line) {
                    Ok(CardInput::Choose(choice)) => {
                        draft.choice = Some(choice);
                        match wizard.confirm(&draft) {
                            Ok(()) => draft = DecisionDraft::default(),
                            Err(e) => {
                                eprintln!("   ❌ {}", e);
                                draft.choice = None;
                                draft.range_override = None;
                            }
                        }
                    }
                    Ok(CardInput::ToggleRule) => {
                        draft.create_rule = !draft.create_rule;
                        let state = if draft.create_rule { "on" } else { "off" };
                        println!("   📏 Create rule: {}", state);
                    }
                    Ok(CardInput::Range(min, max)) => {
                        draft = draft.with_range(min, max);
                        println!("   📐 Range override set");
                    }
                    Ok(CardInput::Skip) => {
                        wizard.skip()?;
                        draft = DecisionDraft::default();
                    }
                    Ok(CardInput::Cancel) => {
                        if confirm("Discard every decision of this review?")? {
                            wizard.cancel(true)?;
                            println!("🚫 Review cancelled, nothing applied.");
                            return Ok(());
                        }
                    }
                    Ok(CardInput::Help) => println!("{}", CARD_HELP),
                    Err(e) => eprintln!("   ❌ {}", e),
                }
            }

            Phase::Finalizing => {
                let (records, summary) =
                    wizard.inspect(|s| (s.decisions().to_vec(), s.summary()))?;
                println!("{}", render_decisions(&records, &summary));

                let Some(line) = prompt("➜ [a]pply / [e]xport / [m]odify <n> / [q]uit")? else {
                    println!("\n🚪 Input closed, nothing applied.");
                    return Ok(());
                };
                match parse_final_input(&line) {
                    Ok(FinalInput::Apply) => {
                        println!("⚙️  Applying {} decision(s)...", records.len());
                        match wizard.apply().await {
                            Ok(report) => {
                                println!(
                                    "✅ Applied: {} change(s), {} record(s) modified, {} rule(s) created",
                                    report.changes_applied,
                                    report.records_modified,
                                    report.rules_created
                                );
                            }
                            Err(e) => eprintln!("❌ Apply failed, decisions kept: {}", e),
                        }
                    }
                    Ok(FinalInput::Export) => match wizard.export().await {
                        Ok(receipt) => println!("💾 Decisions exported to {}", receipt.path),
                        Err(e) => eprintln!("❌ Export failed: {}", e),
                    },
                    Ok(FinalInput::Modify(n)) => {
                        if let Err(e) = wizard.modify(n) {
                            eprintln!("   ❌ {}", e);
                        }
                    }
                    Ok(FinalInput::Cancel) => {
                        if confirm(&format!("Discard {} decision(s)?", records.len()))? {
                            wizard.cancel(true)?;
                            println!("🚫 Review cancelled, nothing applied.");
                            return Ok(());
                        }
                    }
                    Ok(FinalInput::Help) => println!("{}", FINAL_HELP),
                    Err(e) => eprintln!("   ❌ {}", e),
                }
            }

            Phase::Applied => return Ok(()),

            other => anyhow::bail!("Unexpected wizard phase: {}", other),
        }
    }
}
