//! Routing of powers and roots across the A, K, R and log-log scales, and
//! the four-step log method past their limits.

use slipstick_engine::{generate_tutorial, Player, SimulatedInstrument, Tutorial};
use slipstick_model::RuleProfile;

fn on_versalog_ii(text: &str) -> Tutorial {
    generate_tutorial(text, &RuleProfile::versalog_ii()).unwrap()
}

fn on_versalog(text: &str) -> Tutorial {
    generate_tutorial(text, &RuleProfile::versalog()).unwrap()
}

fn narrations(tutorial: &Tutorial) -> Vec<String> {
    tutorial
        .steps
        .iter()
        .filter_map(|step| step.narration().map(|n| n.text.clone()))
        .collect()
}

fn assert_says(texts: &[String], needle: &str) {
    assert!(
        texts.iter().any(|t| t.contains(needle)),
        "no narration contains {needle:?}:\n{texts:#?}"
    );
}

fn play_to_completion(tutorial: &Tutorial) -> Option<bool> {
    let mut player = Player::new(&tutorial.steps, SimulatedInstrument::new());
    player.play_all();
    player.check_passed()
}

#[test]
fn squares_read_on_the_a_scale() {
    let tutorial = on_versalog_ii("3^2");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "Square 3: move the cursor to 3 on the D scale and read the square on the A \
         scale directly above.",
    );
    assert_says(&texts, "Read the result 9 on the A scale.");
    assert_says(&texts, "Check the hairline: the A scale should read 9. Result: 3^2 = 9");
    assert_eq!(play_to_completion(&tutorial), Some(true));
}

#[test]
fn squares_fall_back_to_the_root_scales() {
    // The first-generation layout has no A scale; R1/R2 run in reverse.
    let small = on_versalog("3^2");
    assert_says(
        &narrations(&small),
        "this rule has no A scale, but the root scales work in reverse. Move the \
         cursor to 3 on R1 and read the square on the D scale.",
    );
    assert_eq!(play_to_completion(&small), Some(true));

    // A mantissa past sqrt(10) squares into the second decade, on R2.
    let large = on_versalog("4^2");
    assert_says(&narrations(&large), "Move the cursor to 4 on R2 and read the square");
    assert_eq!(play_to_completion(&large), Some(true));
}

#[test]
fn cubes_absorb_the_carry_in_three_decades() {
    let tutorial = on_versalog_ii("2^3");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "Cube 2: move the cursor to 2 on the D scale and read the cube on the K scale; \
         its three decades absorb the carry.",
    );
    assert_says(&texts, "Read the result 8 on the K scale.");
    assert_eq!(play_to_completion(&tutorial), Some(true));
}

#[test]
fn negative_bases_carry_their_sign_in_the_narration() {
    let tutorial = on_versalog_ii("(-2)^3");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "Read the result -8 on the K scale. (The scales show the magnitude; the sign \
         is tracked separately.)",
    );
    assert_says(&texts, "Result: (-2)^3 = -8");
    // The check verifies the magnitude reading.
    assert_eq!(play_to_completion(&tutorial), Some(true));
}

#[test]
fn cube_roots_pick_the_third_by_decimal_exponent() {
    let left = on_versalog_ii("8^(1/3)");
    let texts = narrations(&left);
    assert_says(
        &texts,
        "Cube root of 8: the decimal exponent picks the left third of the K scale. \
         Move the cursor to 8 on K and read the root on the D scale.",
    );
    assert_says(&texts, "Read the result 2 on the D scale.");
    assert_eq!(play_to_completion(&left), Some(true));

    let middle = on_versalog_ii("27^(1/3)");
    assert_says(
        &narrations(&middle),
        "picks the middle third of the K scale. Move the cursor to 27 on K",
    );
    assert_eq!(play_to_completion(&middle), Some(true));
}

#[test]
fn log_log_bands_carry_true_values() {
    let tutorial = on_versalog_ii("1.5^3");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "Power 1.5^3 using the log-log scales: set the hairline over 1.5 on the LL2 \
         scale. The log-log bands carry true values, not mantissas.",
    );
    assert_says(
        &texts,
        "Move the slide so the left index (1) of C is under the cursor.",
    );
    assert_says(&texts, "Move the cursor to 3 on the C scale (standing in for the exponent 3).");
    assert_says(
        &texts,
        "Read 3.375 under the hairline on the LL3 scale. (Do not read D here: on the \
         log-log bands the value under the hairline is absolute.)",
    );
    assert_says(&texts, "Check the hairline: the LL3 scale should read 3.375.");
    assert_eq!(play_to_completion(&tutorial), Some(true));
}

#[test]
fn fractional_exponents_step_down_a_band() {
    // 2^0.2: the exponent's mantissa goes on C and the reading drops one
    // band toward 1.
    let tutorial = on_versalog_ii("2^0.2");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "The exponent is below 1, so the reading drops 1 band toward 1.",
    );
    assert_says(&texts, "Read 1.149 under the hairline on the LL2 scale.");
    assert_eq!(play_to_completion(&tutorial), Some(true));
}

#[test]
fn negative_exponents_reflect_to_the_reciprocal_bands() {
    let tutorial = on_versalog_ii("10^-3");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "The exponent is negative, so the reading reflects onto the reciprocal LL/ bands.",
    );
    assert_says(&texts, "Read 0.001 under the hairline on the LL/3 scale.");
    assert_eq!(play_to_completion(&tutorial), Some(true));

    // Without reciprocal bands the same power goes through the log method.
    let fallback = on_versalog("10^-3");
    assert_says(
        &narrations(&fallback),
        "falls where no log-log band can resolve it. Use the log method",
    );
    assert_eq!(play_to_completion(&fallback), Some(true));
}

#[test]
fn big_exponents_take_the_log_method() {
    let tutorial = on_versalog_ii("2^10");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "2^10 = 1.02 x 10^3 has an exponent beyond the single decade of C. Use the \
         log method: log10(a^b) = b x log10(a).",
    );
    assert_says(
        &texts,
        "Step A: find log10(2). Move the cursor to 2 on D and read the L scale: \
         log10(2) is about 0.301.",
    );
    assert_says(
        &texts,
        "Step C: read 3.01 on D under the hairline; it stands for 3.01. Split that \
         into characteristic 3 and log mantissa 0.0103.",
    );
    assert_says(
        &texts,
        "Step D: take the antilog. Move the cursor to 0.0103 on the L scale and read \
         the result mantissa on D: about 1.02 (a slide-rule reading, 3-4 significant \
         figures).",
    );
    assert_says(&texts, "Result: 2^10 = 1.02 x 10^3, in full 1.02 x 10^3.");
    assert_eq!(play_to_completion(&tutorial), Some(true));
}

#[test]
fn results_past_ll3_take_the_log_method() {
    let tutorial = on_versalog_ii("3^12");
    assert_says(
        &narrations(&tutorial),
        "runs past the end of the LL3 scale (about 22,026)",
    );
    assert_eq!(play_to_completion(&tutorial), Some(true));
}

#[test]
fn degenerate_powers_have_nothing_to_set() {
    let one = on_versalog_ii("1^5");
    assert_says(&narrations(&one), "1 raised to any power is 1; there is nothing to set.");
    assert_eq!(play_to_completion(&one), None);

    let zero_exp = on_versalog_ii("5^0");
    assert_says(
        &narrations(&zero_exp),
        "Any base to the power 0 is 1; there is nothing to set.",
    );
    assert_eq!(play_to_completion(&zero_exp), None);

    let negative_base = on_versalog_ii("(-2)^5");
    assert_says(
        &narrations(&negative_base),
        "The power -2^5 cannot be set on logarithmic scales (the base has no \
         logarithm). Computed directly, it is -32.",
    );
    assert_eq!(play_to_completion(&negative_base), None);
}

#[test]
fn square_root_halves_follow_the_exponent_parity() {
    // 16 = 1.6 x 10^1: an odd exponent reads on the right half of A.
    let odd = on_versalog_ii("sqrt(16)");
    let texts = narrations(&odd);
    assert_says(
        &texts,
        "Square root of 16: the decimal exponent is odd, so use the right half of the \
         A scale. Move the cursor to 16 on A and read the root on the D scale.",
    );
    assert_says(&texts, "Read the result 4 on the D scale.");
    assert_eq!(play_to_completion(&odd), Some(true));

    let even = on_versalog_ii("sqrt(2)");
    assert_says(
        &narrations(&even),
        "the decimal exponent is even, so use the left half of the A scale. Move the \
         cursor to 2 on A",
    );
    assert_eq!(play_to_completion(&even), Some(true));
}

#[test]
fn root_scales_demand_a_reentry_before_chaining() {
    // On the R layout the root lands on R1/R2, which have no index linkage
    // back to C and D; continuing the chain re-enters the value on D.
    let tutorial = on_versalog("sqrt(2)*2");
    let texts = narrations(&tutorial);
    assert_says(
        &texts,
        "Square root of 2: move the cursor to 2 on the D scale. The decimal exponent \
         is even, which picks the R1 scale; read the root there.",
    );
    assert_says(&texts, "Read the result 1.414 on R1.");
    assert_says(
        &texts,
        "The root scales have no index of their own, so the chain cannot continue \
         from there directly. Re-enter the value: move the cursor to 1.414 on the D \
         scale.",
    );
    assert_eq!(play_to_completion(&tutorial), Some(true));
}
