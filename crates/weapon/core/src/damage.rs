//! Damage-type tags carried by hit contexts and matched by trigger filters.

use bitflags::bitflags;

use crate::codec::normalize_key;

bitflags! {
    /// Tags describing what produced a hit and what it landed on.
    ///
    /// An empty mask means "any" when used as a trigger inclusion filter.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DamageType: u16 {
        const BULLET    = 1 << 0;
        const MELEE     = 1 << 1;
        const EXPLOSIVE = 1 << 2;
        const DOT       = 1 << 3;
        const WEAKSPOT  = 1 << 4;
        const ARMOR     = 1 << 5;
        const ENEMY     = 1 << 6;
        const PLAYER    = 1 << 7;
        const LOCK      = 1 << 8;
        const TERRAIN   = 1 << 9;
    }
}

/// Canonical names in encoding order, followed by accepted synonyms.
const NAMES: &[(&str, DamageType, &[&str])] = &[
    ("Bullet", DamageType::BULLET, &["bullet", "gun", "shot"]),
    ("Melee", DamageType::MELEE, &["melee", "swing"]),
    ("Explosive", DamageType::EXPLOSIVE, &["explosive", "explosion"]),
    ("DOT", DamageType::DOT, &["dot", "damageovertime"]),
    ("Weakspot", DamageType::WEAKSPOT, &["weakspot", "precision", "crit"]),
    ("Armor", DamageType::ARMOR, &["armor"]),
    ("Enemy", DamageType::ENEMY, &["enemy"]),
    ("Player", DamageType::PLAYER, &["player", "friendly"]),
    ("Lock", DamageType::LOCK, &["lock"]),
    ("Terrain", DamageType::TERRAIN, &["terrain", "environment", "wall"]),
];

impl DamageType {
    /// Parses a mask such as `"Bullet | Weakspot"`. Unknown names are skipped.
    pub fn parse_mask(text: &str) -> Self {
        text.split(['|', ',', '+'])
            .map(normalize_key)
            .filter_map(|token| Self::from_token(&token))
            .fold(Self::empty(), |mask, flag| mask | flag)
    }

    /// Extracts the tags named by whole words of a compound trigger name.
    ///
    /// Words split on separators and case changes (`"Weakspot Bullet Hit"`,
    /// `"WeakspotBulletHit"`). A run without boundaries such as
    /// `"weakspotbullethit"` is split only when it is made of tag words
    /// followed by a trigger word.
    pub fn scan_name(name: &str) -> Self {
        let words: Vec<String> = split_words(name).into_iter().flat_map(split_compound).collect();
        let mut mask = Self::empty();
        for start in 0..words.len() {
            let mut joined = String::new();
            for word in &words[start..] {
                joined.push_str(word);
                if let Some(flag) = Self::from_token(&joined) {
                    mask |= flag;
                }
            }
        }
        mask
    }

    /// Canonical textual form used by the encoder.
    pub fn mask_names(self) -> String {
        if self.is_empty() {
            return "Any".to_string();
        }
        NAMES
            .iter()
            .filter(|(_, flag, _)| self.contains(*flag))
            .map(|(name, _, _)| *name)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn from_token(token: &str) -> Option<Self> {
        if token == "any" || token == "none" {
            return Some(Self::empty());
        }
        NAMES
            .iter()
            .find(|(_, _, synonyms)| synonyms.contains(&token))
            .map(|(_, flag, _)| *flag)
    }
}

/// Words that end a compound trigger name.
const TRIGGER_WORDS: &[&str] = &["hit", "charge", "damage", "kill"];

/// Lowercase words split on non-alphanumerics and case changes.
/// `"DOTDamage"` yields `dot`, `damage`.
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let boundary = c.is_uppercase()
            && prev.is_some_and(|p| {
                p.is_lowercase()
                    || p.is_numeric()
                    || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
            });
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Splits `"weakspotbullethit"` into its tag words and trailing trigger
/// word. Any other word comes back whole.
fn split_compound(word: String) -> Vec<String> {
    let body = word.strip_prefix("on").unwrap_or(&word);
    for trigger in TRIGGER_WORDS {
        if let Some(mut pieces) = body.strip_suffix(trigger).and_then(segment) {
            pieces.push((*trigger).to_string());
            return pieces;
        }
    }
    vec![word]
}

fn segment(text: &str) -> Option<Vec<String>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    NAMES
        .iter()
        .flat_map(|(_, _, synonyms)| synonyms.iter())
        .find_map(|synonym| {
            let mut pieces = segment(text.strip_prefix(synonym)?)?;
            pieces.insert(0, (*synonym).to_string());
            Some(pieces)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_separators_and_synonyms() {
        let mask = DamageType::parse_mask("Bullet | Precision, explosion");
        assert_eq!(
            mask,
            DamageType::BULLET | DamageType::WEAKSPOT | DamageType::EXPLOSIVE
        );
        assert_eq!(DamageType::parse_mask("Any"), DamageType::empty());
        assert_eq!(DamageType::parse_mask("nonsense"), DamageType::empty());
    }

    #[test]
    fn names_round_trip() {
        let mask = DamageType::ENEMY | DamageType::DOT;
        assert_eq!(mask.mask_names(), "DOT | Enemy");
        assert_eq!(DamageType::parse_mask(&mask.mask_names()), mask);
        assert_eq!(DamageType::empty().mask_names(), "Any");
    }

    #[test]
    fn scan_finds_embedded_tags() {
        assert_eq!(
            DamageType::scan_name("Weakspot Bullet Hit"),
            DamageType::WEAKSPOT | DamageType::BULLET
        );
        assert_eq!(DamageType::scan_name("Kill"), DamageType::empty());
        assert_eq!(
            DamageType::scan_name("weakspotbullethit"),
            DamageType::WEAKSPOT | DamageType::BULLET
        );
        assert_eq!(DamageType::scan_name("DOTDamage"), DamageType::DOT);
        assert_eq!(DamageType::scan_name("Damage Over Time Kill"), DamageType::DOT);
        assert_eq!(DamageType::scan_name("OnExplosiveKill"), DamageType::EXPLOSIVE);
    }

    #[test]
    fn scan_ignores_tags_inside_other_words() {
        assert_eq!(DamageType::scan_name("shotgunlock"), DamageType::empty());
        assert_eq!(DamageType::scan_name("Unblocked Kill"), DamageType::empty());
        assert_eq!(DamageType::scan_name("AntidoteHit"), DamageType::empty());
        assert_eq!(DamageType::scan_name("ShotgunLock Hit"), DamageType::LOCK);
    }
}
