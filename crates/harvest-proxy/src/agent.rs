use rand::rngs::OsRng;
use rand::Rng;

const VERSIONS: &[&str] = &[
    "126.0.6478.114",
    "126.0.6478.62",
    "126.0.6478.61",
    "126.0.6478.56",
    "124.0.6367.243",
    "124.0.6367.233",
    "124.0.6367.230",
    "124.0.6367.221",
    "124.0.6367.208",
    "124.0.6367.201",
    "124.0.6367.118",
    "123.0.6358.132",
    "123.0.6358.121",
    "122.0.6345.98",
    "122.0.6345.67",
];

const OPERATING_SYSTEMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "Windows NT 6.1; Win64; x64",
    "Macintosh; Intel Mac OS X 10_14_6",
];

/// Generates User-Agent strings simulating Google Chrome browsers.
///
/// Draws uniformly at random (OS-level cryptographic RNG) from fixed
/// version and operating-system lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeUserAgent;

impl ChromeUserAgent {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self) -> String {
        let version = VERSIONS[draw(VERSIONS.len())];
        let os = OPERATING_SYSTEMS[draw(OPERATING_SYSTEMS.len())];
        format!(
            "Mozilla/5.0 ({os}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Safari/537.36"
        )
    }
}

fn draw(bound: usize) -> usize {
    OsRng.gen_range(0..bound)
}
