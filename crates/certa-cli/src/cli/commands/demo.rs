use crate::cli::args::{DemoArgs, GlobalArgs};
use crate::exit_codes;
use std::time::Duration;

/// (answer, question) pairs: correct, wrong, and ambiguous answers.
const EXAMPLES: &[(&str, &str)] = &[
    ("2", "What is 1 + 1?"),
    ("13", "What is 6 + 6?"),
    ("March", "What is the third month in alphabetical order?"),
    ("3", "How many r's are in the word 'strawberry'?"),
    ("It depends.", "Is the sentence 'I always lie.' true or false?"),
];

pub async fn run(args: DemoArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let scorer = super::build_scorer(global)?;

    for (i, (answer, question)) in EXAMPLES.iter().enumerate() {
        if i > 0 && args.pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.pause_ms)).await;
        }
        let result = scorer.explain(answer, question).await?;
        print!("{}", super::score::render(question, answer, &result));
    }
    Ok(exit_codes::SUCCESS)
}
