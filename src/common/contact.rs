// src/common/contact.rs

// ---
// Helpers de contato: a "régua" única para comparar e-mails e telefones
// ---

/// Normaliza um telefone para somente dígitos ASCII.
/// Ex: "+55 (71) 99999-0000" -> "5571999990000"
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Compara dois e-mails ignorando maiúsculas/minúsculas.
pub fn email_matches(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

/// Compara dois telefones após normalizar para dígitos.
/// Strings vazias nunca casam (telefone ausente não é duplicata).
pub fn phone_matches(a: &str, b: &str) -> bool {
    let a = normalize_phone(a);
    let b = normalize_phone(b);
    !a.is_empty() && a == b
}
