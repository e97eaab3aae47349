//! Post-walk classification pass
//!
//! Runs once over a freshly built [`HeaderModel`] and normalizes it in
//! place: fills unstamped visibility, defaults fixed-multiplicity sizes,
//! sorts members deterministically and upgrades class stereotypes based on
//! pure-virtual counts. The pass is idempotent, so re-running it on an
//! already classified model changes nothing.

use crate::schema::{
    ClassModel, HeaderModel, MethodModel, Multiplicity, PropertyModel, RelationshipModel,
    Stereotype, Visibility,
};

/// Normalize the model in place. Call exactly once after the walk;
/// calling again is harmless.
pub fn classify(header: &mut HeaderModel) {
    for class in &mut header.classes {
        classify_class(class);
    }
}

fn classify_class(class: &mut ClassModel) {
    for property in &mut class.properties {
        if property.visibility == Visibility::None {
            property.visibility = Visibility::Private;
        }
    }
    for method in &mut class.methods {
        if method.visibility == Visibility::None {
            method.visibility = Visibility::Public;
        }
    }

    default_fixed_sizes(&mut class.generalizations);
    default_fixed_sizes(&mut class.realizations);
    default_fixed_sizes(&mut class.dependencies);
    default_fixed_sizes(&mut class.associations);
    default_fixed_sizes(&mut class.unidirectional_associations);
    default_fixed_sizes(&mut class.compositions);
    default_fixed_sizes(&mut class.aggregations);

    sort_members(class);
    upgrade_stereotype(class);
}

/// A fixed multiplicity without an explicit element count means one element
fn default_fixed_sizes(relationships: &mut [RelationshipModel]) {
    for rel in relationships {
        if rel.target_multiplicity == Multiplicity::ToFixed && rel.target_fixed_size.is_none() {
            rel.target_fixed_size = Some(1);
        }
    }
}

/// Deterministic member order, independent of declaration order.
///
/// Methods: constructors, then destructors, then the rest; non-static before
/// static within a group; name ascending. Properties: public, protected,
/// private; non-static before static; name ascending. Sorts are stable, so
/// overload sets keep their declaration order.
fn sort_members(class: &mut ClassModel) {
    let simple = class.simple_name().to_string();

    class
        .methods
        .sort_by(|a, b| method_key(a, &simple).cmp(&method_key(b, &simple)));
    class
        .properties
        .sort_by(|a, b| property_key(a).cmp(&property_key(b)));
}

fn method_key<'m>(method: &'m MethodModel, class_simple_name: &str) -> (u8, bool, &'m str) {
    let group = if method.is_constructor_of(class_simple_name) {
        0
    } else if method.is_destructor() {
        1
    } else {
        2
    };
    (group, method.is_static, method.name.as_str())
}

fn property_key(property: &PropertyModel) -> (u8, bool, &str) {
    let rank = match property.visibility {
        Visibility::Public => 0,
        Visibility::Protected => 1,
        Visibility::Private => 2,
        Visibility::None => 3,
    };
    (rank, property.is_static, property.name.as_str())
}

/// Pure-virtual census over ordinary methods (constructors and destructors
/// do not count): all pure means Interface, some pure means AbstractClass,
/// none leaves the class-key stereotype alone.
fn upgrade_stereotype(class: &mut ClassModel) {
    let simple = class.simple_name().to_string();
    let ordinary: Vec<&MethodModel> = class
        .methods
        .iter()
        .filter(|m| !m.is_constructor_of(&simple) && !m.is_destructor())
        .collect();

    let total = ordinary.len();
    let pure = ordinary.iter().filter(|m| m.is_pure_virtual).count();

    if total > 0 && pure == total {
        class.stereotype = Stereotype::Interface;
    } else if pure > 0 && pure < total {
        class.stereotype = Stereotype::AbstractClass;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RelationshipKind;

    fn method(name: &str) -> MethodModel {
        MethodModel {
            name: name.into(),
            return_type: "void".into(),
            ..Default::default()
        }
    }

    fn pure_method(name: &str) -> MethodModel {
        MethodModel {
            is_virtual: true,
            is_pure_virtual: true,
            ..method(name)
        }
    }

    fn property(name: &str, visibility: Visibility) -> PropertyModel {
        PropertyModel {
            name: name.into(),
            visibility,
            ..Default::default()
        }
    }

    #[test]
    fn test_visibility_fallbacks() {
        let mut class = ClassModel::new("C", Stereotype::Class);
        class.properties.push(property("p", Visibility::None));
        class.methods.push(method("m"));
        classify_class(&mut class);
        assert_eq!(class.properties[0].visibility, Visibility::Private);
        assert_eq!(class.methods[0].visibility, Visibility::Public);
    }

    #[test]
    fn test_stamped_visibility_untouched() {
        let mut class = ClassModel::new("C", Stereotype::Class);
        class.properties.push(property("p", Visibility::Protected));
        classify_class(&mut class);
        assert_eq!(class.properties[0].visibility, Visibility::Protected);
    }

    #[test]
    fn test_fixed_multiplicity_defaults_to_one() {
        let mut class = ClassModel::new("C", Stereotype::Class);
        let mut rel = RelationshipModel::new(RelationshipKind::Composition, "Part");
        rel.target_multiplicity = Multiplicity::ToFixed;
        class.compositions.push(rel);

        let mut sized = RelationshipModel::new(RelationshipKind::Composition, "Buffer");
        sized.target_multiplicity = Multiplicity::ToFixed;
        sized.target_fixed_size = Some(16);
        class.compositions.push(sized);

        classify_class(&mut class);
        assert_eq!(class.compositions[0].target_fixed_size, Some(1));
        assert_eq!(class.compositions[1].target_fixed_size, Some(16));
    }

    #[test]
    fn test_method_sort_ctor_dtor_first() {
        let mut class = ClassModel::new("Widget", Stereotype::Class);
        class.methods.push(method("zoom"));
        class.methods.push(MethodModel {
            name: "~Widget".into(),
            return_type: String::new(),
            ..Default::default()
        });
        class.methods.push(method("area"));
        class.methods.push(MethodModel {
            name: "Widget".into(),
            return_type: String::new(),
            ..Default::default()
        });
        classify_class(&mut class);
        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Widget", "~Widget", "area", "zoom"]);
    }

    #[test]
    fn test_method_sort_nonstatic_before_static() {
        let mut class = ClassModel::new("C", Stereotype::Class);
        class.methods.push(MethodModel {
            is_static: true,
            ..method("alpha")
        });
        class.methods.push(method("beta"));
        classify_class(&mut class);
        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
    }

    #[test]
    fn test_property_sort_by_visibility_then_name() {
        let mut class = ClassModel::new("C", Stereotype::Class);
        class.properties.push(property("z", Visibility::Public));
        class.properties.push(property("a", Visibility::Private));
        class.properties.push(property("m", Visibility::Protected));
        class.properties.push(property("b", Visibility::Public));
        classify_class(&mut class);
        let names: Vec<&str> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "z", "m", "a"]);
    }

    #[test]
    fn test_overload_order_is_stable() {
        let mut class = ClassModel::new("C", Stereotype::Class);
        let mut first = method("run");
        first.parameters.push(Default::default());
        let second = method("run");
        class.methods.push(first);
        class.methods.push(second);
        classify_class(&mut class);
        assert_eq!(class.methods[0].parameters.len(), 1);
        assert!(class.methods[1].parameters.is_empty());
    }

    #[test]
    fn test_all_pure_virtual_is_interface() {
        let mut class = ClassModel::new("Shape", Stereotype::Class);
        class.methods.push(MethodModel {
            name: "Shape".into(),
            return_type: String::new(),
            ..Default::default()
        });
        class.methods.push(pure_method("draw"));
        class.methods.push(pure_method("area"));
        classify_class(&mut class);
        assert_eq!(class.stereotype, Stereotype::Interface);
    }

    #[test]
    fn test_some_pure_virtual_is_abstract_class() {
        let mut class = ClassModel::new("Base", Stereotype::Class);
        class.methods.push(pure_method("draw"));
        class.methods.push(method("name"));
        classify_class(&mut class);
        assert_eq!(class.stereotype, Stereotype::AbstractClass);
    }

    #[test]
    fn test_no_methods_keeps_class_key_stereotype() {
        let mut class = ClassModel::new("Pod", Stereotype::Struct);
        class.properties.push(property("x", Visibility::Public));
        classify_class(&mut class);
        assert_eq!(class.stereotype, Stereotype::Struct);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut header = HeaderModel {
            file_name: "h.h".into(),
            classes: vec![{
                let mut c = ClassModel::new("C", Stereotype::Class);
                c.methods.push(pure_method("f"));
                c.properties.push(property("p", Visibility::None));
                c
            }],
            enums: Vec::new(),
        };
        classify(&mut header);
        let once = header.clone();
        classify(&mut header);
        assert_eq!(header, once);
    }
}
