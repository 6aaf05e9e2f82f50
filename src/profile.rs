//! Endpoint profiles.
//!
//! The service exposes two upload/lookup endpoints that differ only in their
//! route, lookup parameter, collection and language handling. Each one is
//! described by an [`EndpointProfile`] and served by the same handlers.

/// How a lookup tag is compared against stored languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    Exact,
    CaseInsensitive,
}

/// How an uploaded language tag is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCase {
    /// Stored exactly as received
    AsUploaded,
    /// Upper-cased before storing
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointProfile {
    /// Route serving both upload (POST) and lookup (GET)
    pub route: &'static str,
    /// Query parameter carrying the language tag on lookup
    pub lookup_param: &'static str,
    /// Collection (table) holding this endpoint's records
    pub collection: &'static str,
    pub language_case: LanguageCase,
    pub match_policy: MatchPolicy,
}

/// `/api/audio`: exact match on `lang`, language stored as uploaded
pub const AUDIO_PROFILE: EndpointProfile = EndpointProfile {
    route: "/api/audio",
    lookup_param: "lang",
    collection: "audioFiles",
    language_case: LanguageCase::AsUploaded,
    match_policy: MatchPolicy::Exact,
};

/// `/api/getAudio`: case-insensitive match on `language`, language upper-cased
pub const GET_AUDIO_PROFILE: EndpointProfile = EndpointProfile {
    route: "/api/getAudio",
    lookup_param: "language",
    collection: "audio_files",
    language_case: LanguageCase::Upper,
    match_policy: MatchPolicy::CaseInsensitive,
};

/// Caseless form of a language tag, compared by [`MatchPolicy::CaseInsensitive`].
///
/// Upper-cases before lower-casing so tags whose upper-case form expands
/// (`ß` -> `SS`) fold the same as their stored, upper-cased counterpart.
pub fn fold_case(language: &str) -> String {
    language.to_uppercase().to_lowercase()
}

/// All profiles mounted by the server
pub fn profiles() -> [EndpointProfile; 2] {
    [AUDIO_PROFILE, GET_AUDIO_PROFILE]
}

/// Collection names of all profiles, for schema initialization
pub fn collections() -> Vec<&'static str> {
    profiles().iter().map(|p| p.collection).collect()
}

impl EndpointProfile {
    /// Apply this profile's casing rule to an uploaded language tag
    pub fn normalize_language(&self, language: &str) -> String {
        match self.language_case {
            LanguageCase::AsUploaded => language.to_string(),
            LanguageCase::Upper => language.to_uppercase(),
        }
    }

    /// Error text for a lookup without the language parameter
    pub fn missing_param_message(&self) -> String {
        format!("Query parameter \"{}\" is required.", self.lookup_param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_profile_keeps_language() {
        assert_eq!(AUDIO_PROFILE.normalize_language("en-us"), "en-us");
        assert_eq!(AUDIO_PROFILE.normalize_language("En-US"), "En-US");
    }

    #[test]
    fn test_get_audio_profile_uppercases_language() {
        assert_eq!(GET_AUDIO_PROFILE.normalize_language("en-us"), "EN-US");
    }

    #[test]
    fn test_fold_case_matches_upper_cased_tags() {
        assert_eq!(fold_case("EN-US"), fold_case("en-us"));
        assert_eq!(fold_case("DÉ-Ü"), fold_case("dé-ü"));
        assert_eq!(
            fold_case(&GET_AUDIO_PROFILE.normalize_language("straße")),
            fold_case("straße")
        );
        assert_ne!(fold_case("en_us"), fold_case("en-us"));
    }

    #[test]
    fn test_profiles_use_distinct_collections() {
        let collections = collections();
        assert_eq!(collections, vec!["audioFiles", "audio_files"]);
    }

    #[test]
    fn test_missing_param_message_names_parameter() {
        assert_eq!(
            GET_AUDIO_PROFILE.missing_param_message(),
            "Query parameter \"language\" is required."
        );
    }
}
