//! Built-in fake-data provider.
//!
//! Evaluates expressions made of `#{category.key}` tokens, optionally with
//! quoted arguments and surrounding literal text:
//!
//! ```text
//! #{color.name}                      → "teal"
//! #{name.first_name} #{name.lastName} → "Ada Moreau"
//! #{number.number_between '1','10'}  → "7"
//! ```
//!
//! Category and key are matched case-insensitively, ignoring underscores, so
//! `first_name`, `firstName` and `FIRSTNAME` name the same generator.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use rowplate_core::{
    application::{ApplicationError, ports::FakeDataProvider},
    error::RowplateResult,
};

// ── Word pools ────────────────────────────────────────────────────────────────

const COLORS: &[&str] = &[
    "red", "green", "blue", "yellow", "orange", "purple", "teal", "maroon", "olive", "navy",
    "silver", "white", "black", "pink", "violet", "indigo", "turquoise", "salmon", "plum", "lime",
    "amber", "azure", "beige", "bronze", "burgundy", "cerulean", "charcoal", "chartreuse", "coral",
    "crimson", "cyan", "emerald", "fuchsia", "gold", "gray", "ivory", "jade", "khaki", "lavender",
    "lilac", "magenta", "mauve", "mint", "mustard", "ochre", "peach", "periwinkle", "rose", "ruby",
    "rust", "saffron", "sapphire", "scarlet", "sepia", "tan", "taupe", "topaz", "ultramarine",
    "umber", "vermilion",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
    "Radia", "Donald", "Hedy", "Niklaus", "Katherine", "Tim", "Anita", "Bjarne", "Carol",
    "Dorothy", "Elena", "Fernando", "Guido", "Hannah", "Ivan", "Joan", "Karen", "Leslie", "Marvin",
    "Nora", "Olga", "Peter", "Quentin", "Rosa", "Sophie", "Tomas", "Ursula", "Vint", "Wanda",
    "Xavier", "Yukihiro", "Zelda", "Adele", "Brian", "Claude", "Diana", "Erik", "Fiona", "Gordon",
    "Helen",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Allen", "Dijkstra", "Perlman", "Knuth", "Lamarr", "Wirth", "Johnson", "Berners-Lee", "Borg",
    "Stroustrup", "Shaw", "Vaughan", "Okafor", "Corbato", "Rossum", "Becker", "Sutherland",
    "Goldberg", "Kemeny", "Lamport", "Minsky", "Lindqvist", "Novak", "Naur", "Quinn", "Rivest",
    "Shamir", "Adleman", "Kay", "Cerf", "Backus", "Moreau", "Matsumoto", "Hoare", "Kernighan",
    "Eich", "Wozniak", "Nakamura", "Fischer", "Moore", "Petrov", "Silva",
];

const CITIES: &[&str] = &[
    "Lisbon", "Oslo", "Nairobi", "Osaka", "Toronto", "Lima", "Tallinn", "Porto", "Krakow",
    "Valencia", "Adelaide", "Montreal", "Bergen", "Accra", "Kyoto", "Halifax", "Cusco", "Tartu",
    "Gdansk", "Seville", "Perth", "Quebec", "Dublin", "Zagreb", "Riga", "Vilnius", "Ghent", "Lyon",
    "Bologna", "Malaga", "Graz", "Aarhus", "Tampere", "Cork", "Bilbao", "Leeds",
];

const COUNTRIES: &[&str] = &[
    "Portugal", "Norway", "Kenya", "Japan", "Canada", "Peru", "Estonia", "Poland", "Spain",
    "Australia", "Chile", "Iceland", "Ghana", "Latvia", "Lithuania", "Belgium", "France", "Italy",
    "Austria", "Denmark", "Finland", "Ireland", "Croatia", "Uruguay", "Vietnam", "Morocco",
    "Senegal", "Mexico", "Colombia", "Greece",
];

const STREETS: &[&str] = &[
    "Maple Street", "Harbor Road", "Station Avenue", "Mill Lane", "Church Street", "Park Drive",
    "Bridge Road", "Hillside Avenue",
];

const COMPANIES: &[&str] = &[
    "Acme Corp", "Globex", "Initech", "Umbrella Ltd", "Hooli", "Vandelay Industries",
    "Stark Industries", "Wayne Enterprises",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "test.local"];

const FRUITS: &[&str] = &[
    "apple", "banana", "cherry", "mango", "kiwi", "peach", "plum", "pear", "lemon", "fig",
];

const VEGETABLES: &[&str] = &[
    "carrot", "potato", "onion", "leek", "celery", "spinach", "pepper", "pumpkin",
];

const ANIMALS: &[&str] = &[
    "cat", "dog", "otter", "fox", "heron", "badger", "lynx", "owl", "crab", "gecko",
];

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "magna", "aliqua", "enim", "minim", "veniam",
    "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi", "aliquip", "commodo",
    "consequat", "duis", "aute", "irure", "reprehenderit", "voluptate", "velit", "esse", "cillum",
    "fugiat", "nulla", "pariatur", "excepteur", "sint", "occaecat", "cupidatat", "proident",
];

// ── Expressions ───────────────────────────────────────────────────────────────

/// One `#{...}` token: `category.key` plus quoted arguments.
#[derive(Debug, PartialEq, Eq)]
struct Call<'a> {
    category: String,
    key: String,
    args: Vec<&'a str>,
}

/// Literal text and calls, in order.
#[derive(Debug, PartialEq, Eq)]
enum Part<'a> {
    Text(&'a str),
    Call(Call<'a>),
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_call(body: &str) -> Option<Call<'_>> {
    let body = body.trim();
    let (path, rest) = match body.find(char::is_whitespace) {
        Some(i) => (&body[..i], body[i..].trim()),
        None => (body, ""),
    };
    let (category, key) = path.split_once('.')?;
    if category.is_empty() || key.is_empty() {
        return None;
    }

    let args = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',')
            .map(|a| a.trim().trim_matches('\''))
            .collect()
    };
    Some(Call {
        category: normalize(category),
        key: normalize(key),
        args,
    })
}

fn parse(expression: &str) -> Result<Vec<Part<'_>>, String> {
    let trimmed = expression.trim();
    if !trimmed.contains("#{") {
        return Err("expression must contain a #{category.key} token".into());
    }

    let mut parts = Vec::new();
    let mut rest = trimmed;
    while let Some(start) = rest.find("#{") {
        if start > 0 {
            parts.push(Part::Text(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| "unterminated #{ token".to_string())?;
        let call = parse_call(&after[..end])
            .ok_or_else(|| format!("malformed token '#{{{}}}'", &after[..end]))?;
        parts.push(Part::Call(call));
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        parts.push(Part::Text(rest));
    }
    Ok(parts)
}

fn pick<R: Rng>(rng: &mut R, pool: &[&str]) -> String {
    pool.choose(rng).copied().unwrap_or_default().to_string()
}

/// Upper bound for `number.digits`.
const MAX_DIGITS: usize = 64;

fn digits<R: Rng>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

fn between<R: Rng>(rng: &mut R, args: &[&str]) -> Option<String> {
    let [low, high] = args else {
        return None;
    };
    let low: i64 = low.parse().ok()?;
    let high: i64 = high.parse().ok()?;
    if low >= high {
        return Some(low.to_string());
    }
    Some(rng.random_range(low..high).to_string())
}

/// Value for one call, or `None` when no generator matches.
fn generate<R: Rng>(rng: &mut R, call: &Call<'_>) -> Option<String> {
    let value = match (call.category.as_str(), call.key.as_str()) {
        ("color", "name") => pick(rng, COLORS),
        ("color", "hex") => format!("#{:06x}", rng.random_range(0..0x0100_0000u32)),
        ("name", "firstname") => pick(rng, FIRST_NAMES),
        ("name", "lastname") => pick(rng, LAST_NAMES),
        ("name", "fullname" | "name") => {
            format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
        }
        ("name", "username") => format!(
            "{}.{}",
            pick(rng, FIRST_NAMES).to_lowercase(),
            pick(rng, LAST_NAMES).to_lowercase()
        ),
        ("address", "city") => pick(rng, CITIES),
        ("address", "country") => pick(rng, COUNTRIES),
        ("address", "streetname") => pick(rng, STREETS),
        ("address", "streetaddress") => {
            format!("{} {}", rng.random_range(1..500u32), pick(rng, STREETS))
        }
        ("address", "zipcode" | "postcode") => digits(rng, 5),
        ("company", "name") => pick(rng, COMPANIES),
        ("internet", "domainname") => pick(rng, DOMAINS),
        ("internet", "emailaddress") => format!(
            "{}@{}",
            pick(rng, FIRST_NAMES).to_lowercase(),
            pick(rng, DOMAINS)
        ),
        ("internet", "ipv4address") => format!(
            "{}.{}.{}.{}",
            rng.random_range(1..255u8),
            rng.random_range(0..256u16),
            rng.random_range(0..256u16),
            rng.random_range(1..255u8)
        ),
        ("phonenumber", "cellphone" | "phonenumber") => {
            format!("+1-{}-{}-{}", digits(rng, 3), digits(rng, 3), digits(rng, 4))
        }
        ("food", "fruit") => pick(rng, FRUITS),
        ("food", "vegetable") => pick(rng, VEGETABLES),
        ("animal", "name") => pick(rng, ANIMALS),
        ("lorem", "word") => pick(rng, WORDS),
        ("lorem", "sentence") => {
            let count = rng.random_range(4..9usize);
            let words: Vec<String> = (0..count).map(|_| pick(rng, WORDS)).collect();
            format!("{}.", words.join(" "))
        }
        ("number", "digit") => digits(rng, 1),
        ("number", "digits") => {
            let count: usize = call.args.first().and_then(|a| a.parse().ok()).unwrap_or(4);
            digits(rng, count.clamp(1, MAX_DIGITS))
        }
        ("number", "numberbetween") => between(rng, &call.args)?,
        ("bool", "bool") => rng.random_bool(0.5).to_string(),
        _ => return None,
    };
    Some(value)
}

// ── Provider ──────────────────────────────────────────────────────────────────

/// Fake-data provider backed by built-in word pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFaker;

impl BuiltinFaker {
    pub fn new() -> Self {
        Self
    }
}

impl FakeDataProvider for BuiltinFaker {
    fn evaluate(&self, expression: &str) -> RowplateResult<String> {
        let fail = |reason: String| ApplicationError::FakeData {
            expression: expression.to_string(),
            reason,
        };

        let parts = parse(expression).map_err(fail)?;
        let mut rng = rand::rng();
        let mut out = String::new();
        for part in &parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Call(call) => {
                    let value = generate(&mut rng, call).ok_or_else(|| {
                        fail(format!("unknown generator '{}.{}'", call.category, call.key))
                    })?;
                    out.push_str(&value);
                }
            }
        }
        debug!(%expression, value = %out, "fake value generated");
        Ok(out)
    }
}
