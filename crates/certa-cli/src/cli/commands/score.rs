use crate::cli::args::{GlobalArgs, ScoreArgs};
use crate::exit_codes;
use certa_core::ReflectionResult;
use serde_json::json;

pub async fn run(args: ScoreArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let scorer = super::build_scorer(global)?;
    let result = scorer.explain(&args.answer, &args.question).await?;

    if args.json {
        let out = json!({
            "question": args.question,
            "answer": args.answer,
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render(&args.question, &args.answer, &result));
    }
    Ok(exit_codes::SUCCESS)
}

/// Human-readable summary of one scored answer.
pub(crate) fn render(question: &str, answer: &str, result: &ReflectionResult) -> String {
    let score = match result.mean_score() {
        Some(mean) => format!("{:.2}", mean),
        None => "n/a (no parseable reflections)".to_string(),
    };
    let letters: Vec<String> = result
        .letters()
        .iter()
        .map(|l| l.map(String::from).unwrap_or_else(|| "-".to_string()))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("\nQ: {:?}\n", question));
    out.push_str(&format!("A: {:?}\n", answer));
    out.push_str(&format!("→ averaged score: {}\n", score));
    out.push_str(&format!("  letters: [{}]\n", letters.join(", ")));
    out.push_str("  raw reflections:\n");
    for (i, resp) in result.responses().iter().enumerate() {
        out.push_str(&format!("    [{}] {:?}\n", i + 1, resp));
    }
    out
}
