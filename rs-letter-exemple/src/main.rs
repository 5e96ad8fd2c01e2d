use rs_letter_core::{train_letter_model, LetterRequest, TrainingConfig};

/// Small bundled corpus: a few stitched-together formal letter bodies.
const CORPUS: &str = "Dear Sir, I am writing to bring to your notice the matter discussed below. \
I request you to kindly look into the matter at the earliest. I shall remain grateful for your \
prompt action. I would like to draw your attention to the poor condition of the roads in our \
locality. I hope you will take the necessary steps to resolve this issue. Thanking you in \
anticipation of a favourable reply. I am writing this letter to express my sincere gratitude \
for your support during the past year. Your guidance has been invaluable to me. ";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A configuration small enough to train in seconds on a laptop.
    // The defaults (40-char windows, 128 hidden units, 4 epochs) are
    // meant for real corpora of tens of thousands of characters.
    let config = TrainingConfig {
        seq_len: 20,
        stride: 3,
        batch_size: 64,
        epochs: 2,
        learning_rate: 0.01,
        hidden: 32,
    };

    // Train on the bundled corpus (repeated so the window set is not tiny)
    let corpus = CORPUS.repeat(4);
    let trained = train_letter_model(&corpus, &config, &mut rand::rng())?;
    println!(
        "Trained on {} characters, vocabulary of {} distinct characters\n",
        trained.corpus_len(),
        trained.vocabulary_size()
    );

    // Generate a few letters at different temperatures
    // Low temperature sticks close to the most likely characters,
    // high temperature drifts into more surprising output
    for temperature in [0.2, 0.5, 1.0] {
        let request = LetterRequest {
            length: 120,
            temperature,
            recipient: "Mr. Smith\n12 North Street".to_owned(),
            sender: "Jane Doe".to_owned(),
            purpose: "Complaint about street lighting".to_owned(),
        };
        println!("--- temperature {temperature} ---");
        println!("{}\n", trained.generate(&request, &mut rand::rng())?);
    }

    // The purpose line drives template selection; an unknown purpose
    // falls back to a generic body
    let request = LetterRequest {
        length: 60,
        temperature: 0.5,
        recipient: "The Manager".to_owned(),
        sender: "Jane Doe".to_owned(),
        purpose: "Quarterly review".to_owned(),
    };
    println!("--- generic template ---");
    println!("{}\n", trained.generate(&request, &mut rand::rng())?);

    // Temperature must be strictly positive
    let invalid = LetterRequest {
        length: 10,
        temperature: 0.0,
        recipient: "Mr. Smith".to_owned(),
        sender: "Jane Doe".to_owned(),
        purpose: "enquiry".to_owned(),
    };
    match trained.generate(&invalid, &mut rand::rng()) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Temperature 0.0 is invalid: {e}"),
    }

    // Training on an empty corpus is rejected up front
    match train_letter_model("", &config, &mut rand::rng()) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Empty corpus is invalid: {e}"),
    }

    Ok(())
}
