//! Trampoline symbol mangling.
//!
//! The mangled name is a pure function of the trampoline tuple: stable
//! across runs, injective, and valid for every supported linker. The
//! scheme is part of the compiled ABI; changing it requires bumping
//! [`MANGLING_VERSION`], which is embedded in every symbol.
//!
//! Encoding: ASCII alphanumerics pass through, `/` becomes `_`, and every
//! other character becomes `$` followed by four lowercase hex digits per
//! UTF-16 unit. `_` and `$` therefore never occur literally, and the `.`
//! separating tuple components can never be produced by a component, so
//! distinct tuples always yield distinct symbols.

use std::fmt::Write as _;

use crate::trampoline::{Trampoline, TrampolineSet};

/// Compatibility marker of the mangling scheme.
pub const MANGLING_VERSION: u32 = 1;

/// Mangled linkage symbol for `trampoline`.
#[must_use]
pub fn trampoline_symbol(trampoline: &Trampoline) -> String {
    let mut out = format!(
        "_kiln{MANGLING_VERSION}.{}.{}.{}",
        trampoline.kind().as_str(),
        mangle(trampoline.calling_class()),
        mangle(trampoline.target_class()),
    );
    if let (Some(name), Some(desc)) = (trampoline.member_name(), trampoline.member_desc()) {
        out.push('.');
        out.push_str(&mangle(name));
        out.push('.');
        out.push_str(&mangle(desc));
    }
    out
}

/// Encode one tuple component.
#[must_use]
pub fn mangle(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut units = [0u16; 2];
    for ch in component.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if ch == '/' {
            out.push('_');
        } else {
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(out, "${unit:04x}");
            }
        }
    }
    out
}

/// Digest of the ordered symbol sequence of `set`.
///
/// Two compilations whose trampoline sets agree produce the same
/// fingerprint regardless of how per-class sets were merged; the emitter
/// records it next to the object file to detect linkage drift.
#[must_use]
pub fn linkage_fingerprint(set: &TrampolineSet) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&MANGLING_VERSION.to_le_bytes());
    for trampoline in set.iter() {
        hasher.update(trampoline.symbol().as_bytes());
        hasher.update(b"\0");
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trampoline::{ClassRef, MemberRef, NativeRef};
    use expect_test::expect;

    fn invoke(calling: &str, target: &str, name: &str, desc: &str) -> Trampoline {
        Trampoline::Invokevirtual(
            MemberRef::new(calling, target, name, desc).expect("member ref"),
        )
    }

    #[test]
    fn symbols_embed_the_scheme_version_and_kind() {
        let trampoline = invoke(
            "app/Main",
            "java/lang/Object",
            "equals",
            "(Ljava/lang/Object;)Z",
        );
        expect![
            "_kiln1.invokevirtual.app_Main.java_lang_Object.equals.$0028Ljava_lang_Object$003b$0029Z"
        ]
        .assert_eq(&trampoline.symbol());
    }

    #[test]
    fn class_only_variants_omit_the_member_components() {
        let trampoline =
            Trampoline::New(ClassRef::new("app/Main", "java/lang/String").expect("class ref"));
        expect!["_kiln1.new.app_Main.java_lang_String"].assert_eq(&trampoline.symbol());
    }

    #[test]
    fn escaping_keeps_slash_and_underscore_apart() {
        assert_eq!(mangle("a/b"), "a_b");
        assert_eq!(mangle("a_b"), "a$005fb");
        assert_eq!(mangle("Outer$Inner"), "Outer$0024Inner");
        assert_ne!(mangle("a/b"), mangle("a_b"));
    }

    #[test]
    fn escaping_handles_non_ascii_names() {
        assert_eq!(mangle("héh"), "h$00e9h");
        // Supplementary-plane characters encode both UTF-16 units.
        assert_eq!(mangle("a\u{10400}"), "a$d801$dc00");
    }

    #[test]
    fn mangling_is_injective_across_close_tuples() {
        let tuples = [
            invoke("app/Main", "app/Util", "run", "()V"),
            invoke("app/Main", "app/Util", "run", "(I)V"),
            invoke("app/Main", "app/Util", "ru", "n()V"),
            invoke("app/Main", "app/Utilru", "n", "()V"),
            invoke("app/Main/app", "Util", "run", "()V"),
            invoke("app_Main", "app/Util", "run", "()V"),
            Trampoline::Invokespecial(
                MemberRef::new("app/Main", "app/Util", "run", "()V").expect("ref"),
            ),
        ];
        let mut symbols: Vec<_> = tuples.iter().map(Trampoline::symbol).collect();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), tuples.len());
    }

    #[test]
    fn fingerprint_ignores_merge_order() {
        let a = invoke("app/A", "app/B", "one", "()V");
        let b = invoke("app/A", "app/B", "two", "()V");
        let native = Trampoline::NativeCall(
            NativeRef::new("app/A", "app/C", "nat", "()V", true).expect("ref"),
        );

        let mut forward = TrampolineSet::new();
        forward.insert(a.clone());
        forward.insert(b.clone());
        forward.insert(native.clone());

        let mut backward = TrampolineSet::new();
        backward.insert(native);
        backward.insert(b);
        backward.insert(a);

        assert_eq!(linkage_fingerprint(&forward), linkage_fingerprint(&backward));
    }

    #[test]
    fn fingerprint_tracks_set_contents() {
        let mut set = TrampolineSet::new();
        set.insert(invoke("app/A", "app/B", "one", "()V"));
        let before = linkage_fingerprint(&set);
        set.insert(invoke("app/A", "app/B", "two", "()V"));
        assert_ne!(before, linkage_fingerprint(&set));
    }
}
