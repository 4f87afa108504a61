use kiln::ir::types::Type;
use kiln::lower::wellknown;
use kiln::trampoline::symbols::{linkage_fingerprint, trampoline_symbol};
use kiln::trampoline::{ClassRef, MemberRef, NativeRef, Trampoline, TrampolineSet};

fn member(name: &str, desc: &str) -> MemberRef {
    MemberRef::new("app/Caller", "app/Target", name, desc).expect("member ref")
}

#[test]
fn bridge_calls_order_by_name_then_descriptor() {
    let earlier = Trampoline::BridgeCall(
        NativeRef::new("app/Caller", "app/Target", "alpha", "(I)V", false).expect("ref"),
    );
    let by_name = Trampoline::BridgeCall(
        NativeRef::new("app/Caller", "app/Target", "beta", "(I)V", false).expect("ref"),
    );
    let by_desc = Trampoline::BridgeCall(
        NativeRef::new("app/Caller", "app/Target", "alpha", "(J)V", false).expect("ref"),
    );
    assert!(earlier < by_name);
    assert!(earlier < by_desc);
    assert!(by_desc < by_name);
}

#[test]
fn the_set_stays_a_set_under_repeated_insertion() {
    let mut set = TrampolineSet::new();
    let call = Trampoline::Invokestatic(member("run", "()V"));
    assert!(set.insert(call.clone()));
    assert!(!set.insert(call.clone()));
    assert_eq!(set.len(), 1);
    assert!(set.contains(&call));
}

#[test]
fn iteration_follows_the_total_order_not_insertion_order() {
    let mut set = TrampolineSet::new();
    set.insert(Trampoline::New(
        ClassRef::new("app/Caller", "app/Target").expect("ref"),
    ));
    set.insert(Trampoline::Invokevirtual(member("run", "()V")));
    set.insert(Trampoline::GetField(member("count", "I")));

    let kinds: Vec<_> = set.iter().map(|t| t.kind().as_str()).collect();
    assert_eq!(kinds, vec!["invokevirtual", "getfield", "new"]);
}

#[test]
fn per_class_sets_merge_into_one_contract() {
    let mut first = TrampolineSet::new();
    first.insert(Trampoline::Invokevirtual(member("run", "()V")));
    first.insert(Trampoline::New(
        ClassRef::new("app/Caller", "app/Target").expect("ref"),
    ));

    let mut second = TrampolineSet::new();
    second.insert(Trampoline::Invokevirtual(member("run", "()V")));
    second.insert(Trampoline::Instanceof(
        ClassRef::new("app/Other", "app/Target").expect("ref"),
    ));

    let mut merged_left = first.clone();
    merged_left.merge(second.clone());
    let mut merged_right = second;
    merged_right.merge(first);

    assert_eq!(merged_left, merged_right);
    assert_eq!(merged_left.len(), 3);
    assert_eq!(
        linkage_fingerprint(&merged_left),
        linkage_fingerprint(&merged_right)
    );
}

#[test]
fn symbols_are_distinct_for_distinct_trampolines() {
    let trampolines = vec![
        Trampoline::Invokevirtual(member("run", "()V")),
        Trampoline::Invokespecial(member("run", "()V")),
        Trampoline::Invokestatic(member("run", "()V")),
        Trampoline::Invokeinterface(member("run", "()V")),
        Trampoline::GetField(member("value", "I")),
        Trampoline::PutField(member("value", "I")),
        Trampoline::GetStatic(member("value", "I")),
        Trampoline::PutStatic(member("value", "I")),
        Trampoline::LdcClass(ClassRef::new("app/Caller", "app/Target").expect("ref")),
        Trampoline::Checkcast(ClassRef::new("app/Caller", "[Lapp/Target;").expect("ref")),
        Trampoline::Instanceof(ClassRef::new("app/Caller", "app/Target").expect("ref")),
        Trampoline::New(ClassRef::new("app/Caller", "app/Target").expect("ref")),
        Trampoline::NewArray(ClassRef::new("app/Caller", "[I").expect("ref")),
        Trampoline::BridgeCall(
            NativeRef::new("app/Caller", "app/Target", "run", "()V", false).expect("ref"),
        ),
        Trampoline::NativeCall(
            NativeRef::new("app/Caller", "app/Target", "run", "()V", true).expect("ref"),
        ),
    ];

    let mut symbols: Vec<_> = trampolines.iter().map(trampoline_symbol).collect();
    symbols.sort();
    symbols.dedup();
    assert_eq!(symbols.len(), trampolines.len());
    for symbol in &symbols {
        assert!(symbol.starts_with("_kiln1."), "unversioned symbol {symbol}");
        assert!(
            symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.')),
            "linker-hostile character in {symbol}"
        );
    }
}

#[test]
fn stub_signatures_match_the_variant_contracts() {
    let get_static = Trampoline::GetStatic(member("limit", "D"));
    let sig = get_static.function_type().expect("signature");
    assert_eq!(sig.ret, Type::Double);
    assert_eq!(sig.params, vec![wellknown::ENV_PTR.clone()]);

    let checkcast =
        Trampoline::Checkcast(ClassRef::new("app/Caller", "app/Target").expect("ref"));
    let sig = checkcast.function_type().expect("signature");
    assert_eq!(sig.ret, wellknown::OBJECT_PTR.clone());
    assert_eq!(
        sig.params,
        vec![wellknown::ENV_PTR.clone(), wellknown::OBJECT_PTR.clone()]
    );

    // Bridge and native calls share the native signature: the receiver
    // slot is present even for statics.
    let bridge = Trampoline::BridgeCall(
        NativeRef::new("app/Caller", "app/Target", "sum", "(II)I", true).expect("ref"),
    );
    let native = Trampoline::NativeCall(
        NativeRef::new("app/Caller", "app/Target", "sum", "(II)I", true).expect("ref"),
    );
    assert_eq!(
        bridge.function_type().expect("signature"),
        native.function_type().expect("signature")
    );
    assert_eq!(
        bridge.function_type().expect("signature").params.len(),
        4
    );
}

#[test]
fn malformed_member_descriptors_surface_as_errors() {
    let invoke = Trampoline::Invokevirtual(member("run", "(I"));
    assert!(invoke.function_type().is_err());
    let get = Trampoline::GetField(member("value", "Q"));
    assert!(get.function_type().is_err());
}
