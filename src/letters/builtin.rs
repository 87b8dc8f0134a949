//! Built-in patterns for the 28 hijaiyah letters.
//!
//! Frequency bands and durations are rough targets for an isolated letter
//! pronounced with fathah by an adult speaker.

use super::{FrequencyRange, LetterPattern, PhoneticAttribute};
use super::PhoneticAttribute::*;

const LIPS: &str = "Asy-Syafatain (both lips)";
const TONGUE_TIP_INCISOR_ROOTS: &str =
    "Tip of the tongue against the roots of the upper incisors";
const TONGUE_TIP_INCISOR_EDGES: &str =
    "Tip of the tongue against the edges of the upper incisors";
const TONGUE_TIP_LOWER_INCISORS: &str =
    "Tip of the tongue close to the inner side of the lower incisors";
const TONGUE_MIDDLE: &str = "Middle of the tongue against the hard palate";
const THROAT_MIDDLE: &str = "Wasth al-halq (middle of the throat)";
const THROAT_TOP: &str = "Adna al-halq (top of the throat)";
const THROAT_BOTTOM: &str = "Aqsa al-halq (deepest part of the throat)";

struct Entry {
    id: u32,
    glyph: &'static str,
    latin: &'static str,
    phoneme: &'static str,
    range: (f64, f64),
    duration_ms: f64,
    makhraj: &'static str,
    attributes: &'static [PhoneticAttribute],
    errors: &'static [&'static str],
    tips: &'static [&'static str],
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: 1,
        glyph: "ا",
        latin: "Alif",
        phoneme: "ʔa",
        range: (200.0, 800.0),
        duration_ms: 150.0,
        makhraj: "Al-Jauf (the open space of the mouth and throat)",
        attributes: &[Voiced, Continuant],
        errors: &["Cutting the vowel too short", "Pushing the sound from the throat"],
        tips: &[
            "Keep the mouth open and let the air flow freely",
            "Hold the sound for two counts without straining the throat",
        ],
    },
    Entry {
        id: 2,
        glyph: "ب",
        latin: "Ba",
        phoneme: "b",
        range: (100.0, 600.0),
        duration_ms: 120.0,
        makhraj: LIPS,
        attributes: &[Voiced, PlosiveEcho],
        errors: &["Lips not fully closed", "Missing the qalqalah bounce when stopped"],
        tips: &[
            "Press both lips together firmly before releasing",
            "Let the lips bounce open slightly when the letter carries sukun",
        ],
    },
    Entry {
        id: 3,
        glyph: "ت",
        latin: "Ta",
        phoneme: "t",
        range: (1000.0, 4000.0),
        duration_ms: 100.0,
        makhraj: TONGUE_TIP_INCISOR_ROOTS,
        attributes: &[Unvoiced, Plosive],
        errors: &["Sounding like a heavy tha (ط)", "Too much voicing"],
        tips: &[
            "Touch the tongue tip to the roots of the upper front teeth",
            "Release with a light puff of air and keep it thin",
        ],
    },
    Entry {
        id: 4,
        glyph: "ث",
        latin: "Tsa",
        phoneme: "θ",
        range: (2000.0, 6000.0),
        duration_ms: 130.0,
        makhraj: TONGUE_TIP_INCISOR_EDGES,
        attributes: &[Unvoiced, Continuant],
        errors: &["Pronounced as sin (س)", "Tongue hidden behind the teeth"],
        tips: &[
            "Let the tongue tip show slightly between the front teeth",
            "Keep the air flowing over the tongue without voicing",
        ],
    },
    Entry {
        id: 5,
        glyph: "ج",
        latin: "Jim",
        phoneme: "d͡ʒ",
        range: (500.0, 2000.0),
        duration_ms: 140.0,
        makhraj: TONGUE_MIDDLE,
        attributes: &[Voiced, PlosiveEcho],
        errors: &["Softened into a zh sound", "Missing the qalqalah bounce"],
        tips: &[
            "Raise the middle of the tongue to the palate and release firmly",
            "Add a short echo when the letter is stopped",
        ],
    },
    Entry {
        id: 6,
        glyph: "ح",
        latin: "Ha",
        phoneme: "ħ",
        range: (300.0, 1500.0),
        duration_ms: 180.0,
        makhraj: THROAT_MIDDLE,
        attributes: &[Unvoiced, Continuant],
        errors: &["Pronounced as ha (ه)", "Turned into kha (خ) with friction"],
        tips: &[
            "Narrow the middle of the throat and breathe the sound out",
            "Keep it smooth, without any scraping",
        ],
    },
    Entry {
        id: 7,
        glyph: "خ",
        latin: "Kha",
        phoneme: "x",
        range: (800.0, 2500.0),
        duration_ms: 160.0,
        makhraj: THROAT_TOP,
        attributes: &[Unvoiced, Continuant],
        errors: &["Pronounced as kaf (ك)", "Too little friction"],
        tips: &[
            "Raise the back of the tongue towards the soft palate",
            "Let the air rub through with a light scraping sound",
        ],
    },
    Entry {
        id: 8,
        glyph: "د",
        latin: "Dal",
        phoneme: "d",
        range: (200.0, 1000.0),
        duration_ms: 90.0,
        makhraj: TONGUE_TIP_INCISOR_ROOTS,
        attributes: &[Voiced, PlosiveEcho],
        errors: &["Pronounced as ta (ت)", "Missing the qalqalah bounce"],
        tips: &[
            "Place the tongue tip at the roots of the upper front teeth",
            "Voice the release and bounce it when stopped",
        ],
    },
    Entry {
        id: 9,
        glyph: "ذ",
        latin: "Dzal",
        phoneme: "ð",
        range: (1500.0, 5000.0),
        duration_ms: 130.0,
        makhraj: TONGUE_TIP_INCISOR_EDGES,
        attributes: &[Voiced, Continuant],
        errors: &["Pronounced as zay (ز)", "Pronounced as dal (د)"],
        tips: &[
            "Show the tongue tip slightly between the teeth",
            "Keep the vocal folds vibrating while the air flows",
        ],
    },
    Entry {
        id: 10,
        glyph: "ر",
        latin: "Ra",
        phoneme: "r",
        range: (300.0, 1800.0),
        duration_ms: 110.0,
        makhraj: "Tip of the tongue, slightly behind the point of nun",
        attributes: &[Voiced],
        errors: &["Rolling the tongue too many times", "Pronounced as lam (ل)"],
        tips: &[
            "Tap the tongue tip once against the gum ridge",
            "Avoid a long trill",
        ],
    },
    Entry {
        id: 11,
        glyph: "ز",
        latin: "Za",
        phoneme: "z",
        range: (3000.0, 7000.0),
        duration_ms: 140.0,
        makhraj: TONGUE_TIP_LOWER_INCISORS,
        attributes: &[Voiced, Continuant],
        errors: &["Pronounced as sin (س)", "Pronounced as dzal (ذ)"],
        tips: &[
            "Keep the tongue tip low behind the lower front teeth",
            "Add a buzzing vibration to the whistle",
        ],
    },
    Entry {
        id: 12,
        glyph: "س",
        latin: "Sin",
        phoneme: "s",
        range: (4000.0, 8000.0),
        duration_ms: 150.0,
        makhraj: TONGUE_TIP_LOWER_INCISORS,
        attributes: &[Unvoiced, Continuant],
        errors: &["Pronounced as tsa (ث)", "Pronounced as shad (ص)"],
        tips: &[
            "Keep a narrow gap between the tongue tip and the teeth",
            "Produce a clear, thin whistle",
        ],
    },
    Entry {
        id: 13,
        glyph: "ش",
        latin: "Syin",
        phoneme: "ʃ",
        range: (2500.0, 6000.0),
        duration_ms: 150.0,
        makhraj: TONGUE_MIDDLE,
        attributes: &[Unvoiced, Continuant],
        errors: &["Pronounced as sin (س)", "Air not spread across the mouth"],
        tips: &[
            "Raise the middle of the tongue towards the palate",
            "Let the air spread out through the whole mouth",
        ],
    },
    Entry {
        id: 14,
        glyph: "ص",
        latin: "Shad",
        phoneme: "sˤ",
        range: (3500.0, 7500.0),
        duration_ms: 150.0,
        makhraj: TONGUE_TIP_LOWER_INCISORS,
        attributes: &[Unvoiced, Continuant],
        errors: &["Pronounced as a light sin (س)", "Lips rounded too much"],
        tips: &[
            "Raise the back of the tongue to give the letter weight",
            "Keep the whistle while thickening the sound",
        ],
    },
    Entry {
        id: 15,
        glyph: "ض",
        latin: "Dhad",
        phoneme: "dˤ",
        range: (300.0, 1500.0),
        duration_ms: 140.0,
        makhraj: "Side edges of the tongue against the upper molars",
        attributes: &[Voiced, Continuant],
        errors: &["Pronounced as dal (د)", "Pronounced as zha (ظ)"],
        tips: &[
            "Press one or both sides of the tongue against the upper molars",
            "Stretch the sound along the side of the tongue",
        ],
    },
    Entry {
        id: 16,
        glyph: "ط",
        latin: "Tha",
        phoneme: "tˤ",
        range: (800.0, 3000.0),
        duration_ms: 110.0,
        makhraj: TONGUE_TIP_INCISOR_ROOTS,
        attributes: &[Voiced, PlosiveEcho],
        errors: &["Pronounced as a light ta (ت)", "Missing the qalqalah bounce"],
        tips: &[
            "Raise the back of the tongue for a heavy sound",
            "Release firmly and bounce when stopped",
        ],
    },
    Entry {
        id: 17,
        glyph: "ظ",
        latin: "Zha",
        phoneme: "ðˤ",
        range: (1200.0, 4500.0),
        duration_ms: 140.0,
        makhraj: TONGUE_TIP_INCISOR_EDGES,
        attributes: &[Voiced, Continuant],
        errors: &["Pronounced as zay (ز)", "Pronounced as a light dzal (ذ)"],
        tips: &[
            "Show the tongue tip between the teeth and raise the back of the tongue",
            "Keep the sound heavy and voiced",
        ],
    },
    Entry {
        id: 18,
        glyph: "ع",
        latin: "Ain",
        phoneme: "ʕ",
        range: (400.0, 1600.0),
        duration_ms: 170.0,
        makhraj: THROAT_MIDDLE,
        attributes: &[Voiced],
        errors: &["Replaced by a glottal stop", "Throat not tightened"],
        tips: &[
            "Tighten the middle of the throat while voicing",
            "Avoid closing the throat completely",
        ],
    },
    Entry {
        id: 19,
        glyph: "غ",
        latin: "Ghain",
        phoneme: "ɣ",
        range: (600.0, 2200.0),
        duration_ms: 160.0,
        makhraj: THROAT_TOP,
        attributes: &[Voiced, Continuant],
        errors: &["Pronounced as a French r", "Pronounced as kha (خ) without voice"],
        tips: &[
            "Use the same place as kha but add voicing",
            "Keep a gargling quality without stopping the air",
        ],
    },
    Entry {
        id: 20,
        glyph: "ف",
        latin: "Fa",
        phoneme: "f",
        range: (2500.0, 7000.0),
        duration_ms: 140.0,
        makhraj: "Inner part of the lower lip against the tips of the upper incisors",
        attributes: &[Unvoiced, Continuant],
        errors: &["Pronounced as a voiced v", "Lip pressed too hard"],
        tips: &[
            "Touch the upper teeth lightly to the inside of the lower lip",
            "Blow the air out gently",
        ],
    },
    Entry {
        id: 21,
        glyph: "ق",
        latin: "Qaf",
        phoneme: "q",
        range: (300.0, 1200.0),
        duration_ms: 110.0,
        makhraj: "Back of the tongue against the soft palate",
        attributes: &[Voiced, PlosiveEcho],
        errors: &["Pronounced as kaf (ك)", "Missing the qalqalah bounce"],
        tips: &[
            "Close the back of the tongue against the soft palate",
            "Release deep in the mouth with a bounce when stopped",
        ],
    },
    Entry {
        id: 22,
        glyph: "ك",
        latin: "Kaf",
        phoneme: "k",
        range: (1500.0, 4000.0),
        duration_ms: 100.0,
        makhraj: "Back of the tongue, slightly forward of the point of qaf",
        attributes: &[Unvoiced, Plosive],
        errors: &["Pronounced as qaf (ق)", "Release too weak"],
        tips: &[
            "Touch the tongue a little further forward than for qaf",
            "Let a light breath follow the release",
        ],
    },
    Entry {
        id: 23,
        glyph: "ل",
        latin: "Lam",
        phoneme: "l",
        range: (250.0, 1200.0),
        duration_ms: 120.0,
        makhraj: "Edge of the tongue tip against the gum above the upper incisors",
        attributes: &[Voiced],
        errors: &["Made heavy where it should be light", "Tongue not touching the gum"],
        tips: &[
            "Touch the gum ridge with the front edge of the tongue",
            "Keep it light unless it follows a heavy vowel in Allah",
        ],
    },
    Entry {
        id: 24,
        glyph: "م",
        latin: "Mim",
        phoneme: "m",
        range: (100.0, 500.0),
        duration_ms: 150.0,
        makhraj: LIPS,
        attributes: &[Voiced],
        errors: &["Lips not closed", "No nasal resonance"],
        tips: &[
            "Close both lips softly",
            "Let the sound resonate through the nose",
        ],
    },
    Entry {
        id: 25,
        glyph: "ن",
        latin: "Nun",
        phoneme: "n",
        range: (150.0, 700.0),
        duration_ms: 140.0,
        makhraj: "Tip of the tongue against the gum above the upper incisors",
        attributes: &[Voiced],
        errors: &["No nasal resonance", "Tongue placed too far back"],
        tips: &[
            "Touch the tongue tip to the gum ridge",
            "Carry the sound through the nose",
        ],
    },
    Entry {
        id: 26,
        glyph: "و",
        latin: "Waw",
        phoneme: "w",
        range: (150.0, 800.0),
        duration_ms: 140.0,
        makhraj: "Asy-Syafatain (rounded lips)",
        attributes: &[Voiced, Continuant],
        errors: &["Lips not rounded", "Pronounced as a v"],
        tips: &[
            "Round the lips without letting them touch",
            "Keep the sound open and voiced",
        ],
    },
    Entry {
        id: 27,
        glyph: "ه",
        latin: "Ha",
        phoneme: "h",
        range: (300.0, 1400.0),
        duration_ms: 150.0,
        makhraj: THROAT_BOTTOM,
        attributes: &[Unvoiced, Continuant],
        errors: &["Swallowed or dropped", "Pronounced as ha (ح)"],
        tips: &[
            "Breathe out from the deepest part of the throat",
            "Keep it audible, even at the end of a word",
        ],
    },
    Entry {
        id: 28,
        glyph: "ي",
        latin: "Ya",
        phoneme: "j",
        range: (200.0, 2500.0),
        duration_ms: 140.0,
        makhraj: TONGUE_MIDDLE,
        attributes: &[Voiced, Continuant],
        errors: &["Tongue not raised", "Merged into the vowel"],
        tips: &[
            "Raise the middle of the tongue close to the palate",
            "Keep the glide short and clear",
        ],
    },
];

pub fn builtin_patterns() -> Vec<LetterPattern> {
    ENTRIES
        .iter()
        .map(|entry| LetterPattern {
            id: entry.id,
            glyph: entry.glyph.to_string(),
            latin_name: entry.latin.to_string(),
            phoneme: entry.phoneme.to_string(),
            frequency_range: FrequencyRange::new(entry.range.0, entry.range.1),
            expected_duration_ms: entry.duration_ms,
            articulation_point: entry.makhraj.to_string(),
            attributes: entry.attributes.to_vec(),
            common_errors: entry.errors.iter().map(|s| s.to_string()).collect(),
            remediation_tips: entry.tips.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}
