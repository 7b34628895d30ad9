/// Floor for the loss term so a pure gain never divides by zero.
const LOSS_EPSILON: f64 = 1e-9;

/// Single-sample RSI approximation over one lookback pair.
///
/// `100 - 100 / (1 + gain/loss)` where gain = max(change, 0) and
/// loss = max(-change, epsilon), with change measured between the lookback
/// sample and the current price. This is deliberately NOT Wilder's
/// multi-period RSI: the screener compares exactly one historical sample
/// against the live price, so a rising pair saturates towards 100 and a
/// falling pair towards 0. An unchanged price yields 0 (gain 0 against the
/// epsilon loss floor).
pub fn single_sample_rsi(current: f64, past: f64) -> f64 {
    let change = current - past;
    let gain = change.max(0.0);
    let loss = (-change).max(LOSS_EPSILON);
    100.0 - 100.0 / (1.0 + gain / loss)
}
