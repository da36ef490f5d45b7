//! LaTeX → Unicode transliteration.
//!
//! Fallback path for notification rendering when the external math
//! renderer is unavailable: covers fractions, roots, sub/superscripts,
//! common Greek letters and operators. Lossy by design — the browsable
//! artifact keeps the original LaTeX for full typesetting.

/// Command name → Unicode symbol. Names are matched exactly after the
/// full alphabetic run is consumed, so prefixes cannot shadow each other.
const COMMANDS: &[(&str, &str)] = &[
    ("varepsilon", "ε"),
    ("rightarrow", "→"),
    ("leftarrow", "←"),
    ("partial", "∂"),
    ("epsilon", "ε"),
    ("lambda", "λ"),
    ("approx", "≈"),
    ("nabla", "∇"),
    ("infty", "∞"),
    ("alpha", "α"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("theta", "θ"),
    ("sigma", "σ"),
    ("omega", "ω"),
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Sigma", "Σ"),
    ("Omega", "Ω"),
    ("Lambda", "Λ"),
    ("times", "×"),
    ("cdot", "·"),
    ("beta", "β"),
    ("prod", "Π"),
    ("geq", "≥"),
    ("leq", "≤"),
    ("neq", "≠"),
    ("int", "∫"),
    ("sum", "Σ"),
    ("phi", "φ"),
    ("psi", "ψ"),
    ("chi", "χ"),
    ("tau", "τ"),
    ("eta", "η"),
    ("rho", "ρ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("pm", "±"),
    ("pi", "π"),
    ("to", "→"),
];

fn superscript(c: char) -> Option<char> {
    match c {
        '0' => Some('⁰'),
        '1' => Some('¹'),
        '2' => Some('²'),
        '3' => Some('³'),
        '4' => Some('⁴'),
        '5' => Some('⁵'),
        '6' => Some('⁶'),
        '7' => Some('⁷'),
        '8' => Some('⁸'),
        '9' => Some('⁹'),
        '+' => Some('⁺'),
        '-' => Some('⁻'),
        '=' => Some('⁼'),
        '(' => Some('⁽'),
        ')' => Some('⁾'),
        'n' => Some('ⁿ'),
        'i' => Some('ⁱ'),
        _ => None,
    }
}

fn subscript(c: char) -> Option<char> {
    match c {
        '0' => Some('₀'),
        '1' => Some('₁'),
        '2' => Some('₂'),
        '3' => Some('₃'),
        '4' => Some('₄'),
        '5' => Some('₅'),
        '6' => Some('₆'),
        '7' => Some('₇'),
        '8' => Some('₈'),
        '9' => Some('₉'),
        '+' => Some('₊'),
        '-' => Some('₋'),
        '=' => Some('₌'),
        '(' => Some('₍'),
        ')' => Some('₎'),
        'a' => Some('ₐ'),
        'e' => Some('ₑ'),
        'i' => Some('ᵢ'),
        'j' => Some('ⱼ'),
        'k' => Some('ₖ'),
        'n' => Some('ₙ'),
        'x' => Some('ₓ'),
        _ => None,
    }
}

/// Transliterate one LaTeX expression to plain Unicode text.
pub fn transliterate(tex: &str) -> String {
    let chars: Vec<char> = tex.chars().collect();
    let mut out = String::with_capacity(tex.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 1;
                if i >= chars.len() {
                    break;
                }
                // Collect the command name.
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                match name.as_str() {
                    "frac" => {
                        let num = read_group(&chars, &mut i);
                        let den = read_group(&chars, &mut i);
                        out.push_str(&transliterate(&num));
                        out.push('⁄');
                        out.push_str(&transliterate(&den));
                    }
                    "sqrt" => {
                        let arg = read_group(&chars, &mut i);
                        let inner = transliterate(&arg);
                        out.push('√');
                        if inner.chars().count() > 1 {
                            out.push('(');
                            out.push_str(&inner);
                            out.push(')');
                        } else {
                            out.push_str(&inner);
                        }
                    }
                    "" => {
                        // Escaped symbol like \{ or \$.
                        out.push(chars[i]);
                        i += 1;
                    }
                    _ => {
                        if let Some((_, symbol)) =
                            COMMANDS.iter().find(|(cmd, _)| *cmd == name)
                        {
                            out.push_str(symbol);
                        } else {
                            // Unknown command: keep the bare name.
                            out.push_str(&name);
                        }
                    }
                }
            }
            '^' => {
                i += 1;
                let arg = read_group(&chars, &mut i);
                push_script(&mut out, &transliterate(&arg), superscript, '^');
            }
            '_' => {
                i += 1;
                let arg = read_group(&chars, &mut i);
                push_script(&mut out, &transliterate(&arg), subscript, '_');
            }
            '{' | '}' => i += 1,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Read a `{...}` group (balanced) or a single character at `*i`.
fn read_group(chars: &[char], i: &mut usize) -> String {
    if *i >= chars.len() {
        return String::new();
    }
    if chars[*i] != '{' {
        let c = chars[*i];
        *i += 1;
        return c.to_string();
    }
    *i += 1; // consume '{'
    let mut depth = 1;
    let mut group = String::new();
    while *i < chars.len() {
        let c = chars[*i];
        *i += 1;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        group.push(c);
    }
    group
}

/// Emit a sub/superscript: mapped characters where Unicode has them,
/// otherwise the `marker(...)` spelling.
fn push_script(
    out: &mut String,
    arg: &str,
    map: fn(char) -> Option<char>,
    marker: char,
) {
    let mapped: Option<String> = arg.chars().map(map).collect();
    match mapped {
        Some(s) if !s.is_empty() => out.push_str(&s),
        _ => {
            out.push(marker);
            if arg.chars().count() > 1 {
                out.push('(');
                out.push_str(arg);
                out.push(')');
            } else {
                out.push_str(arg);
            }
        }
    }
}
