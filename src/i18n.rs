//! Translation table: language tags and message templates.
//!
//! English carries every key. The other languages override exactly the
//! keys their catalogs have; everything else falls through the `_` arm to
//! English, which is the "missing key → default language" contract the
//! resolver relies on. Tamil and Hindi carry the full voice set; Spanish,
//! French and German are deliberately partial.

// ═══════════════════════════════════════════
// Language tags
// ═══════════════════════════════════════════

/// Supported language tags. Unknown tags map to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    EnUs,
    TaIn,
    HiIn,
    EsEs,
    FrFr,
    DeDe,
}

impl Language {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "ta-in" | "ta" => Language::TaIn,
            "hi-in" | "hi" => Language::HiIn,
            "es-es" | "es" => Language::EsEs,
            "fr-fr" | "fr" => Language::FrFr,
            "de-de" | "de" => Language::DeDe,
            _ => Language::EnUs,
        }
    }

    /// BCP 47 tag, also used as the speech locale.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::TaIn => "ta-IN",
            Language::HiIn => "hi-IN",
            Language::EsEs => "es-ES",
            Language::FrFr => "fr-FR",
            Language::DeDe => "de-DE",
        }
    }

    /// The language's own name for itself, for the language picker.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::EnUs => "English",
            Language::TaIn => "தமிழ்",
            Language::HiIn => "हिन्दी",
            Language::EsEs => "Español",
            Language::FrFr => "Français",
            Language::DeDe => "Deutsch",
        }
    }

    pub fn all() -> [Language; 6] {
        [
            Language::EnUs,
            Language::TaIn,
            Language::HiIn,
            Language::EsEs,
            Language::FrFr,
            Language::DeDe,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ═══════════════════════════════════════════
// English templates, the complete key set
// ═══════════════════════════════════════════

/// Message template builder. Calm, plain wording aimed at an elderly
/// listener; short sentences that read well spoken aloud.
pub struct Messages;

impl Messages {
    // --- labels ---

    pub fn progress() -> String {
        "Progress".to_string()
    }

    pub fn schedule() -> String {
        "Your Schedule".to_string()
    }

    pub fn no_medications() -> String {
        "No medications yet.".to_string()
    }

    pub fn done_today() -> String {
        "Done for today".to_string()
    }

    pub fn delete_confirm() -> String {
        "Remove this medicine?".to_string()
    }

    pub fn listening() -> String {
        "Listening...".to_string()
    }

    pub fn thinking() -> String {
        "Checking...".to_string()
    }

    pub fn speaking() -> String {
        "Speaking...".to_string()
    }

    pub fn prompt() -> String {
        "Tap to check progress".to_string()
    }

    /// Greeting by local hour: morning before 12, afternoon before 18.
    pub fn greeting(hour: u32) -> String {
        if hour < 12 {
            "Good Morning".to_string()
        } else if hour < 18 {
            "Good Afternoon".to_string()
        } else {
            "Good Evening".to_string()
        }
    }

    // --- voice answers for one matched medication ---

    pub fn voice_no_medications() -> String {
        "You don't have any medications in your list yet.".to_string()
    }

    pub fn voice_taken(name: &str, time: &str) -> String {
        format!("Yes, you took your {name} at {time}.")
    }

    pub fn voice_not_taken(name: &str, time: &str) -> String {
        format!("No, you haven't taken your {name} yet. It is scheduled for {time}.")
    }

    pub fn voice_complete(name: &str, time: &str) -> String {
        format!(
            "{} All done for today, well done!",
            Self::voice_taken(name, time)
        )
    }

    pub fn voice_partial(name: &str, taken: u32, remaining: u32) -> String {
        format!(
            "You have taken your {name} {taken} {} today. {remaining} more {} to go.",
            plural(taken, "time", "times"),
            plural(remaining, "dose", "doses"),
        )
    }

    pub fn voice_detail(name: &str, frequency: u32, taken: u32) -> String {
        format!(
            "{name} should be taken {frequency} {} a day. You have taken it {taken} {} so far.",
            plural(frequency, "time", "times"),
            plural(taken, "time", "times"),
        )
    }

    pub fn voice_unavailable() -> String {
        "Voice features are not available right now.".to_string()
    }

    // --- whole-list summary ---

    pub fn summary_celebration(count: usize) -> String {
        format!("Excellent! You have taken all {count} of your medications for today.")
    }

    pub fn summary_completed(names: &str) -> String {
        format!("You have already finished {names}.")
    }

    pub fn summary_partial(parts: &str) -> String {
        format!("You are partway through {parts}.")
    }

    pub fn summary_not_started(names: &str) -> String {
        format!("You still need to take {names}.")
    }

    pub fn summary_partial_item(name: &str, taken: u32, frequency: u32) -> String {
        format!("{name} ({taken} of {frequency})")
    }

    pub fn summary_slot_item(name: &str, time: &str) -> String {
        format!("{name} at {time}")
    }

    pub fn summary_totals(taken: u32, total: u32) -> String {
        format!("You've taken {taken} of {total} doses today.")
    }

    // --- remote assistant ---

    pub fn assistant_apology() -> String {
        "I am having trouble connecting right now. Please check your list on the screen."
            .to_string()
    }

    pub fn assistant_retry() -> String {
        "I'm sorry, I couldn't understand that. Could you please try again?".to_string()
    }
}

fn plural<'a>(count: u32, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

// ═══════════════════════════════════════════
// Localized dispatch
// ═══════════════════════════════════════════

/// Localized message builder. Each method matches only the languages
/// whose catalog actually carries the key; everything else falls back
/// to the English table.
pub struct MessagesI18n;

impl MessagesI18n {
    pub fn progress(lang: Language) -> String {
        match lang {
            Language::TaIn => "முன்னேற்றம்".to_string(),
            Language::HiIn => "प्रगति".to_string(),
            Language::EsEs => "Progreso".to_string(),
            Language::FrFr => "Progrès".to_string(),
            Language::DeDe => "Fortschritt".to_string(),
            _ => Messages::progress(),
        }
    }

    pub fn schedule(lang: Language) -> String {
        match lang {
            Language::TaIn => "உங்கள் அட்டவணை".to_string(),
            Language::HiIn => "आपका शेड्यूल".to_string(),
            Language::EsEs => "Tu Horario".to_string(),
            Language::FrFr => "Votre Calendrier".to_string(),
            Language::DeDe => "Zeitplan".to_string(),
            _ => Messages::schedule(),
        }
    }

    pub fn no_medications(lang: Language) -> String {
        match lang {
            Language::TaIn => "மருந்துகள் எதுவும் இல்லை.".to_string(),
            Language::HiIn => "अभी कोई दवा नहीं है।".to_string(),
            Language::EsEs => "Sin medicinas.".to_string(),
            _ => Messages::no_medications(),
        }
    }

    pub fn done_today(lang: Language) -> String {
        match lang {
            Language::TaIn => "இன்று முடிந்தது".to_string(),
            Language::HiIn => "आज का कार्य पूर्ण".to_string(),
            Language::EsEs => "Listo por hoy".to_string(),
            _ => Messages::done_today(),
        }
    }

    pub fn delete_confirm(lang: Language) -> String {
        match lang {
            Language::TaIn => "இந்த மருந்தை நீக்கவா?".to_string(),
            Language::HiIn => "क्या आप इस दवा को हटाना चाहते हैं?".to_string(),
            Language::EsEs => "¿Eliminar esta medicina?".to_string(),
            Language::FrFr => "Supprimer ce médicament ?".to_string(),
            Language::DeDe => "Dieses Medikament entfernen?".to_string(),
            _ => Messages::delete_confirm(),
        }
    }

    pub fn listening(lang: Language) -> String {
        match lang {
            Language::TaIn => "கேட்கிறேன்...".to_string(),
            Language::HiIn => "सुन रहा हूँ...".to_string(),
            Language::EsEs => "Escuchando...".to_string(),
            Language::FrFr => "Écoute...".to_string(),
            Language::DeDe => "Zuhören...".to_string(),
            _ => Messages::listening(),
        }
    }

    pub fn thinking(lang: Language) -> String {
        match lang {
            Language::TaIn => "ஆராய்கிறேன்...".to_string(),
            Language::HiIn => "जाँच रहा हूँ...".to_string(),
            _ => Messages::thinking(),
        }
    }

    pub fn speaking(lang: Language) -> String {
        match lang {
            Language::TaIn => "பேசுகிறேன்...".to_string(),
            Language::HiIn => "बोल रहा हूँ...".to_string(),
            _ => Messages::speaking(),
        }
    }

    pub fn prompt(lang: Language) -> String {
        match lang {
            Language::TaIn => "பேசத் தொடங்குங்கள்".to_string(),
            Language::HiIn => "पूछने के लिए दबाएं".to_string(),
            Language::EsEs => "Pulsa para preguntar".to_string(),
            Language::FrFr => "Appuyez pour demander".to_string(),
            Language::DeDe => "Fragen".to_string(),
            _ => Messages::prompt(),
        }
    }

    pub fn voice_no_medications(lang: Language) -> String {
        match lang {
            Language::TaIn => "மருந்துகள் எதுவும் இல்லை.".to_string(),
            Language::HiIn => "अभी कोई दवा नहीं है।".to_string(),
            _ => Messages::voice_no_medications(),
        }
    }

    pub fn voice_taken(lang: Language, name: &str, time: &str) -> String {
        match lang {
            Language::TaIn => {
                format!("ஆம், நீங்கள் {name} மருந்தை {time} மணிக்கு எடுத்துக்கொண்டீர்கள்.")
            }
            Language::HiIn => format!("हाँ, आपने {time} बजे {name} ले ली थी।"),
            _ => Messages::voice_taken(name, time),
        }
    }

    pub fn voice_complete(lang: Language, name: &str, time: &str) -> String {
        match lang {
            Language::TaIn => format!(
                "ஆம், நீங்கள் {name} மருந்தை {time} மணிக்கு எடுத்துக்கொண்டீர்கள். இன்று முடிந்தது."
            ),
            Language::HiIn => {
                format!("हाँ, आपने {time} बजे {name} ले ली थी। आज का कार्य पूर्ण।")
            }
            _ => Messages::voice_complete(name, time),
        }
    }

    pub fn voice_not_taken(lang: Language, name: &str, time: &str) -> String {
        match lang {
            // The Tamil and Hindi catalogs phrase this without the
            // scheduled time.
            Language::TaIn => {
                let _ = time;
                format!("இல்லை, நீங்கள் இன்று இன்னும் {name} மருந்து எடுக்கவில்லை.")
            }
            Language::HiIn => {
                let _ = time;
                format!("नहीं, आपने आज अभी तक {name} नहीं ली है।")
            }
            _ => Messages::voice_not_taken(name, time),
        }
    }

    pub fn voice_detail(lang: Language, name: &str, frequency: u32, taken: u32) -> String {
        match lang {
            Language::TaIn => format!(
                "{name} மருந்தை ஒரு நாளைக்கு {frequency} முறை எடுக்க வேண்டும். \
                 நீங்கள் இதுவரை {taken} முறை எடுத்துள்ளீர்கள்."
            ),
            Language::HiIn => format!(
                "{name} को दिन में {frequency} बार लेना चाहिए। आपने अब तक इसे {taken} बार लिया है।"
            ),
            Language::EsEs => format!(
                "{name} debe tomarse {frequency} veces al día. La ha tomado {taken} veces hasta ahora."
            ),
            Language::FrFr => format!(
                "{name} doit être pris {frequency} fois par jour. Vous l'avez pris {taken} fois jusqu'à présent."
            ),
            Language::DeDe => format!(
                "{name} sollte {frequency} Mal täglich eingenommen werden. Sie haben es bisher {taken} Mal eingenommen."
            ),
            _ => Messages::voice_detail(name, frequency, taken),
        }
    }

    pub fn summary_totals(lang: Language, taken: u32, total: u32) -> String {
        match lang {
            Language::TaIn => {
                format!("இன்று நீங்கள் {total} மருந்துகளில் {taken} மருந்துகளை எடுத்துள்ளீர்கள்.")
            }
            Language::HiIn => format!("आपने आज {total} में से {taken} खुराक ले ली है।"),
            _ => Messages::summary_totals(taken, total),
        }
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
