use regex::Regex;

/// Role labels users paste in from other chats, English and Spanish.
const ROLE_MARKERS: &[&str] = &[
    "user",
    "assistant",
    "question",
    "answer",
    "interaction",
    "usuario",
    "asistente",
    "pregunta",
    "respuesta",
    "interacción",
];

/// Strips role prefixes and `@handle` mentions from user input.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    role_marker: Regex,
    mention: Regex,
}

impl Sanitizer {
    pub fn new() -> Result<Self, regex::Error> {
        let role_marker = Regex::new(&format!(r"(?i)(?:{})\s*:", ROLE_MARKERS.join("|")))?;
        let mention = Regex::new(r"@[\w.\-]+")?;
        Ok(Self {
            role_marker,
            mention,
        })
    }

    /// Returns the cleaned message, possibly empty.
    ///
    /// Removal runs until nothing matches, so a marker spliced together by an
    /// earlier removal is caught too and `clean(clean(x)) == clean(x)`.
    pub fn clean(&self, raw: &str) -> String {
        let mut current = raw.to_string();
        loop {
            let without_roles = self.role_marker.replace_all(&current, "");
            let without_mentions = self.mention.replace_all(&without_roles, "");
            let next = without_mentions.trim().to_string();
            if next == current {
                return next;
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> String {
        Sanitizer::new().unwrap().clean(raw)
    }

    #[test]
    fn strips_role_prefix_and_mention() {
        assert_eq!(clean("Usuario: hola @bob.smith"), "hola");
        assert_eq!(clean("  Respuesta: todo bien  "), "todo bien");
    }

    #[test]
    fn markers_are_case_insensitive_and_anywhere() {
        assert_eq!(clean("hola USER: que tal"), "hola  que tal");
        assert_eq!(clean("INTERACCIÓN: saldo"), "saldo");
        assert_eq!(clean("Question : what? Answer: nothing"), "what?  nothing");
    }

    #[test]
    fn mentions_with_hyphens_and_dots() {
        assert_eq!(clean("@soporte-tecnico.mx necesito ayuda"), "necesito ayuda");
    }

    #[test]
    fn plain_words_are_kept() {
        assert_eq!(clean("the user guide"), "the user guide");
        assert_eq!(clean("correo sin arroba"), "correo sin arroba");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   "), "");
        assert_eq!(clean("Usuario: @alguien"), "");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "Usuario: hola @bob.smith",
            "  Respuesta: todo bien  ",
            "UsuUsuario:ario: hola",
            "Pregunta:Respuesta: @a @b.c fin",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {input:?}");
        }
        assert_eq!(clean("UsuUsuario:ario: hola"), "hola");
    }
}
