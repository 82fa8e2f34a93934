use percent_calc::calc_engine::parser::MAX_DEPTH;
use percent_calc::{calculate, Calculator, CalculatorError, ErrorCause};
use proptest::prelude::*;

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0)
}

#[track_caller]
fn assert_evaluates(expression: &str, expected: f64) {
    let actual = calculate(expression)
        .unwrap_or_else(|e| panic!("{:?} failed: {}", expression, e));
    assert!(approx(actual, expected), "{:?}: expected {}, got {}", expression, expected, actual);
}

#[test]
fn basic_percentage_conversion() {
    assert_evaluates("50%", 0.5);
    assert_evaluates("12.5%", 0.125);
}

#[test]
fn percentage_in_expression() {
    assert_evaluates("200 * 10%", 20.0);
    assert_evaluates("100 + 5%", 100.05);
}

#[test]
fn unary_operations_and_parentheses() {
    assert_evaluates("-(50%)", -0.5);
    assert_evaluates("(25% + 25%) * 4", 2.0);
    assert_evaluates("+-+3", -3.0);
}

#[test]
fn precedence_and_left_associativity() {
    assert_evaluates("2 + 3 * 4", 14.0);
    assert_evaluates("10 - 2 - 3", 5.0);
    assert_evaluates("100 / 10 / 2", 5.0);
    assert_evaluates("2 * (3 + 4) - -1", 15.0);
}

#[test]
fn division_by_zero() {
    let err = calculate("5/0").unwrap_err();
    assert!(err.to_string().contains("Division by zero"));
    assert_eq!(err.cause(), ErrorCause::DivisionByZero);
    assert!(calculate("1 / 0%").is_err());
}

#[test]
fn invalid_expression() {
    let err = calculate("2 + foo").unwrap_err();
    assert_eq!(err.cause(), ErrorCause::Unsupported);
    assert!(err.to_string().contains("foo"));
}

#[test]
fn malformed_input_is_a_syntax_error() {
    for input in ["", "(1 + 2", "1 +", "2 * * 3", "1e5", "%5", "(5)%", "3 $ 4"] {
        let err = calculate(input).unwrap_err();
        assert_eq!(err.cause(), ErrorCause::Syntax, "{:?} gave {}", input, err);
    }
}

#[test]
fn errors_are_std_errors() {
    fn takes_error(_: &dyn std::error::Error) {}
    let err: CalculatorError = calculate("1/0").unwrap_err();
    takes_error(&err);
    let wrapped: anyhow::Error = err.into();
    assert_eq!(wrapped.to_string(), "Division by zero");
}

#[test]
fn shared_calculator_across_threads() {
    let calculator = Calculator::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || calculator.calculate(&format!("{} * 10%", i * 100)))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let value = handle.join().unwrap().unwrap();
        assert!(approx(value, i as f64 * 10.0));
    }
}

/// Runs `f` on a thread with the default 2 MiB stack spawned threads get.
fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn deepest_accepted_nesting_fits_a_thread_stack() {
    let depth = MAX_DEPTH - 1;
    let results = on_small_stack(move || {
        let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let sums = format!("{}1{}", "(1 + ".repeat(depth), ")".repeat(depth));
        let signs = format!("{}1", "-".repeat(depth));
        let too_deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        [
            calculate(&parens),
            calculate(&sums),
            calculate(&signs),
            calculate(&too_deep),
        ]
    });
    assert_eq!(results[0], Ok(1.0));
    assert_eq!(results[1], Ok(MAX_DEPTH as f64));
    assert_eq!(results[2], Ok(-1.0));
    assert_eq!(results[3].as_ref().unwrap_err().cause(), ErrorCause::Syntax);
}

#[test]
fn long_flat_chains_evaluate() {
    let (sum, product) = on_small_stack(|| {
        let sum = calculate(&vec!["1"; 10_000].join(" + "));
        let product = calculate(&vec!["1"; 10_000].join(" * "));
        (sum, product)
    });
    assert_eq!(sum, Ok(10_000.0));
    assert_eq!(product, Ok(1.0));
    assert_eq!(calculate(&vec!["1"; 600].join(" + ")), Ok(600.0));
}

proptest! {
    #[test]
    fn percent_of_integer_is_hundredth(n in 0u32..1_000_000) {
        let value = calculate(&format!("{}%", n)).unwrap();
        prop_assert_eq!(value, n as f64 / 100.0);
    }

    #[test]
    fn percent_of_decimal_is_hundredth(whole in 0u32..10_000, frac in 0u32..1000) {
        let literal = format!("{}.{}", whole, frac);
        let expected: f64 = literal.parse::<f64>().unwrap() / 100.0;
        prop_assert_eq!(calculate(&format!("{}%", literal)).unwrap(), expected);
    }

    #[test]
    fn evaluation_is_repeatable(a in -1000i32..1000, b in 1i32..1000, p in 0u32..500) {
        let expression = format!("({} - {}%) / {}", a, p, b);
        let first = calculate(&expression);
        let second = calculate(&expression);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn displayed_results_evaluate_to_themselves(a in -1.0e6f64..1.0e6, b in 1.0f64..1.0e3) {
        let result = calculate(&format!("{} / {}", a, b)).unwrap();
        let shown = percent_calc::keypad::format_result(result);
        prop_assert_eq!(calculate(&shown).unwrap(), result);
    }
}
