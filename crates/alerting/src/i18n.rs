//! Localized Status and Alert Text

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported display and alert languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en", alias = "english")]
    English,
    #[serde(rename = "ta", alias = "tamil")]
    Tamil,
    #[serde(rename = "hi", alias = "hindi")]
    Hindi,
}

/// Text shown for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Templates {
    pub title: &'static str,
    pub status_safe: &'static str,
    pub status_fault: &'static str,
    pub safe: &'static str,
    pub fault: &'static str,
    pub finished: &'static str,
    /// Body of the WhatsApp/SMS alert
    pub alert: &'static str,
}

const ENGLISH: Templates = Templates {
    title: "🚛 Real-Time Brake Fault Monitoring Dashboard",
    status_safe: "✅ BRAKE STATUS: SAFE",
    status_fault: "⚠️ BRAKE FAULT DETECTED",
    safe: "✅ Vehicle operating normally.",
    fault: "🚨 Brake fault detected! Immediate attention required.",
    finished: "Streaming finished (demo limit)",
    alert: "🚨 Brake fault detected! Immediate maintenance required.",
};

const TAMIL: Templates = Templates {
    title: "🚛 நேரடி பிரேக் கோளாறு கண்காணிப்பு டாஷ்போர்டு",
    status_safe: "✅ பிரேக் நிலை: பாதுகாப்பானது",
    status_fault: "⚠️ பிரேக் கோளாறு கண்டறியப்பட்டது",
    safe: "✅ வாகனம் சாதாரணமாக இயங்குகிறது.",
    fault: "🚨 பிரேக் கோளாறு கண்டறியப்பட்டது! உடனடி கவனம் தேவை.",
    finished: "ஸ்ட்ரீமிங் முடிந்தது (டெமோ வரம்பு)",
    alert: "🚨 பிரேக் கோளாறு கண்டறியப்பட்டது! உடனடி பராமரிப்பு தேவை.",
};

const HINDI: Templates = Templates {
    title: "🚛 रीयल-टाइम ब्रेक फॉल्ट मॉनिटरिंग डैशबोर्ड",
    status_safe: "✅ ब्रेक स्थिति: सुरक्षित",
    status_fault: "⚠️ ब्रेक में खराबी पाई गई",
    safe: "✅ वाहन सामान्य रूप से चल रहा है।",
    fault: "🚨 ब्रेक में खराबी पाई गई! तुरंत ध्यान दें।",
    finished: "स्ट्रीमिंग समाप्त (डेमो सीमा)",
    alert: "🚨 ब्रेक में खराबी पाई गई! तुरंत मरम्मत आवश्यक है।",
};

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Tamil, Language::Hindi];

    /// Short language tag
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Tamil => "ta",
            Language::Hindi => "hi",
        }
    }

    /// Name in the language itself
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Tamil => "தமிழ்",
            Language::Hindi => "हिन्दी",
        }
    }

    pub fn templates(&self) -> &'static Templates {
        match self {
            Language::English => &ENGLISH,
            Language::Tamil => &TAMIL,
            Language::Hindi => &HINDI,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts the tag, the English name, or the native name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                s.eq_ignore_ascii_case(lang.tag())
                    || s == lang.display_name()
                    || s.eq_ignore_ascii_case(english_name(*lang))
            })
            .ok_or_else(|| format!("unsupported language: {s}"))
    }
}

fn english_name(lang: Language) -> &'static str {
    match lang {
        Language::English => "english",
        Language::Tamil => "tamil",
        Language::Hindi => "hindi",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_and_names() {
        assert_eq!("ta".parse::<Language>().unwrap(), Language::Tamil);
        assert_eq!("Hindi".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("हिन्दी".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::English);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_every_language_has_alert_text() {
        for lang in Language::ALL {
            let t = lang.templates();
            assert!(!t.alert.is_empty(), "{lang} alert text missing");
            assert_ne!(t.status_safe, t.status_fault);
        }
        assert_ne!(Language::Tamil.templates().alert, Language::English.templates().alert);
    }

    #[test]
    fn test_serde_uses_tags() {
        assert_eq!(serde_json::to_string(&Language::Hindi).unwrap(), "\"hi\"");
        assert_eq!(
            serde_json::from_str::<Language>("\"tamil\"").unwrap(),
            Language::Tamil
        );
        assert_eq!(Language::default(), Language::English);
    }
}
