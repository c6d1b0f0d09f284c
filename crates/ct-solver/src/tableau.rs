//! Butcher tableaux for the explicit solver family.

/// Coefficients of an explicit Runge-Kutta method.
///
/// `a[r]` holds the weights used to form the trial state evaluated in round
/// `r` (so `a[0]` is empty). `e`, when present, gives the embedded error
/// estimator: `err = h * |sum(e_j * k_j)|`, where the last entry of an FSAL
/// tableau multiplies the derivative at the propagated solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tableau {
    pub c: &'static [f64],
    pub a: &'static [&'static [f64]],
    pub b: &'static [f64],
    pub e: Option<&'static [f64]>,
    /// Order of the propagated solution.
    pub order: u32,
    /// Exponent denominator of the step-size predictor.
    pub error_order: u32,
    /// First-same-as-last: the final round is evaluated at the propagated
    /// solution and only contributes to the error estimate.
    pub fsal: bool,
}

impl Tableau {
    /// Number of rounds per step.
    pub fn stages(&self) -> usize {
        self.c.len()
    }
}

pub const FORWARD_EULER: Tableau = Tableau {
    c: &[0.0],
    a: &[&[]],
    b: &[1.0],
    e: None,
    order: 1,
    error_order: 1,
    fsal: false,
};

/// Heun's method with an embedded Euler estimate.
pub const HEUN_EULER: Tableau = Tableau {
    c: &[0.0, 1.0],
    a: &[&[], &[1.0]],
    b: &[0.5, 0.5],
    e: Some(&[-0.5, 0.5]),
    order: 2,
    error_order: 2,
    fsal: false,
};

/// Bogacki-Shampine 2(3).
pub const BOGACKI_SHAMPINE: Tableau = Tableau {
    c: &[0.0, 0.5, 0.75, 1.0],
    a: &[
        &[],
        &[0.5],
        &[0.0, 0.75],
        &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
    ],
    b: &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0, 0.0],
    e: Some(&[-5.0 / 72.0, 1.0 / 12.0, 1.0 / 9.0, -1.0 / 8.0]),
    order: 3,
    error_order: 3,
    fsal: true,
};

/// Dormand-Prince 4(5).
pub const DORMAND_PRINCE: Tableau = Tableau {
    c: &[0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0],
    a: &[
        &[],
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[
            19372.0 / 6561.0,
            -25360.0 / 2187.0,
            64448.0 / 6561.0,
            -212.0 / 729.0,
        ],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
        &[
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ],
    b: &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ],
    e: Some(&[
        71.0 / 57600.0,
        0.0,
        -71.0 / 16695.0,
        71.0 / 1920.0,
        -17253.0 / 339200.0,
        22.0 / 525.0,
        -1.0 / 40.0,
    ]),
    order: 5,
    error_order: 5,
    fsal: true,
};
