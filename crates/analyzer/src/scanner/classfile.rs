//! 최소한의 JVM 클래스 파일 리더
//!
//! 능력 추출에 필요한 부분만 읽습니다: 상수 풀, 접근 플래그, this/super 클래스,
//! 인터페이스, `ConstantValue`가 붙은 필드, 클래스 수준 런타임 어노테이션.
//! 메서드 본문과 그 밖의 속성은 건너뜁니다.
//!
//! 신뢰할 수 없는 입력에 대해 패닉하지 않아야 합니다. 모든 읽기는 경계 검사를 거치고,
//! 중첩 어노테이션 깊이는 [`MAX_ANNOTATION_DEPTH`]로 제한됩니다.

/// 클래스 파일 매직 넘버
pub const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_MODULE: u16 = 0x8000;

/// 중첩 어노테이션/배열 최대 깊이
pub const MAX_ANNOTATION_DEPTH: usize = 32;

const RETENTION_DESCRIPTOR: &str = "Ljava/lang/annotation/Retention;";
const KOTLIN_METADATA_DESCRIPTOR: &str = "Lkotlin/Metadata;";

/// 클래스 파일 파싱 에러
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("unexpected end of data at offset {0}")]
    Truncated(usize),

    #[error("bad magic {0:#010x}")]
    BadMagic(u32),

    #[error("invalid constant pool index {0}")]
    BadIndex(u16),

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("unknown annotation element tag {0:#04x}")]
    BadElementTag(u8),

    #[error("annotation nesting deeper than {MAX_ANNOTATION_DEPTH}")]
    TooDeep,
}

/// 필드 상수 값 / 어노테이션 상수
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

/// 어노테이션 요소 값
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstantValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

/// 어노테이션 (`Lpkg/Name;` 형식의 타입 디스크립터와 요소)
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub constant_value: Option<ConstantValue>,
}

impl FieldInfo {
    /// 컴파일 타임 상수 (static final + ConstantValue)
    pub fn is_constant(&self) -> bool {
        self.access_flags & (ACC_STATIC | ACC_FINAL) == (ACC_STATIC | ACC_FINAL)
            && self.constant_value.is_some()
    }
}

/// 파싱된 클래스 파일
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub major_version: u16,
    pub access_flags: u16,
    /// 내부 이름 (`a/b/C`)
    pub this_class: String,
    /// `java/lang/Object`와 모듈 디스크립터는 `None`일 수 있음
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldInfo>,
    /// 클래스 수준 `RuntimeVisibleAnnotations`
    pub annotations: Vec<Annotation>,
}

impl ClassFile {
    pub fn parse(data: &[u8]) -> Result<Self, ClassFileError> {
        Parser::new(data).class_file()
    }

    pub fn is_annotation(&self) -> bool {
        self.access_flags & ACC_ANNOTATION != 0
    }

    pub fn is_module(&self) -> bool {
        self.access_flags & ACC_MODULE != 0
    }

    pub fn annotation(&self, type_descriptor: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.type_descriptor == type_descriptor)
    }

    /// 어노테이션 타입의 `@Retention` 정책 이름 (`RUNTIME`, `CLASS`, `SOURCE`)
    ///
    /// `@Retention`이 없으면 JVM 기본값인 `CLASS`입니다.
    pub fn retention(&self) -> &str {
        match self
            .annotation(RETENTION_DESCRIPTOR)
            .and_then(|a| a.element("value"))
        {
            Some(ElementValue::Enum { const_name, .. }) => const_name,
            _ => "CLASS",
        }
    }

    /// `@kotlin.Metadata`의 `k` (종류) 값. 2는 파일 파사드
    pub fn kotlin_kind(&self) -> Option<i32> {
        match self
            .annotation(KOTLIN_METADATA_DESCRIPTOR)?
            .element("k")?
        {
            ElementValue::Const(ConstantValue::Integer(k)) => Some(*k),
            _ => None,
        }
    }
}

// ─── 파서 ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Constant {
    /// 인덱스 0 또는 long/double 다음 칸
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    Other,
}

struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
    pool: Vec<Constant>,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pool: Vec::new(),
        }
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassFileError::Truncated(self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ClassFileError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ClassFileError> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, ClassFileError> {
        let hi = u64::from(self.u32()?);
        let lo = u64::from(self.u32()?);
        Ok((hi << 32) | lo)
    }

    fn constant(&self, index: u16) -> Result<&Constant, ClassFileError> {
        self.pool
            .get(usize::from(index))
            .ok_or(ClassFileError::BadIndex(index))
    }

    fn utf8(&self, index: u16) -> Result<String, ClassFileError> {
        match self.constant(index)? {
            Constant::Utf8(s) => Ok(s.clone()),
            _ => Err(ClassFileError::BadIndex(index)),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, ClassFileError> {
        match self.constant(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(ClassFileError::BadIndex(index)),
        }
    }

    fn constant_value(&self, index: u16) -> Result<ConstantValue, ClassFileError> {
        Ok(match self.constant(index)? {
            Constant::Integer(v) => ConstantValue::Integer(*v),
            Constant::Long(v) => ConstantValue::Long(*v),
            Constant::Float(v) => ConstantValue::Float(*v),
            Constant::Double(v) => ConstantValue::Double(*v),
            Constant::String(s) => ConstantValue::String(self.utf8(*s)?),
            Constant::Utf8(s) => ConstantValue::String(s.clone()),
            _ => return Err(ClassFileError::BadIndex(index)),
        })
    }

    fn read_utf8(&mut self) -> Result<String, ClassFileError> {
        let index = self.u16()?;
        self.utf8(index)
    }

    fn read_class_name(&mut self) -> Result<String, ClassFileError> {
        let index = self.u16()?;
        self.class_name(index)
    }

    fn read_constant_value(&mut self) -> Result<ConstantValue, ClassFileError> {
        let index = self.u16()?;
        self.constant_value(index)
    }

    fn constant_pool(&mut self) -> Result<(), ClassFileError> {
        let count = self.u16()?;
        self.pool = Vec::with_capacity(usize::from(count));
        self.pool.push(Constant::Unusable);

        let mut index: u16 = 1;
        while index < count {
            let tag = self.u8()?;
            let (constant, wide) = match tag {
                1 => {
                    let len = usize::from(self.u16()?);
                    // modified UTF-8은 대부분 일반 UTF-8과 같음
                    let s = String::from_utf8_lossy(self.bytes(len)?).into_owned();
                    (Constant::Utf8(s), false)
                }
                3 => (Constant::Integer(self.u32()? as i32), false),
                4 => (Constant::Float(f32::from_bits(self.u32()?)), false),
                5 => (Constant::Long(self.u64()? as i64), true),
                6 => (Constant::Double(f64::from_bits(self.u64()?)), true),
                7 => (Constant::Class(self.u16()?), false),
                8 => (Constant::String(self.u16()?), false),
                16 | 19 | 20 => {
                    self.bytes(2)?;
                    (Constant::Other, false)
                }
                15 => {
                    self.bytes(3)?;
                    (Constant::Other, false)
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    self.bytes(4)?;
                    (Constant::Other, false)
                }
                _ => return Err(ClassFileError::UnknownTag { tag, index }),
            };
            self.pool.push(constant);
            index = index.saturating_add(1);
            if wide {
                self.pool.push(Constant::Unusable);
                index = index.saturating_add(1);
            }
        }
        Ok(())
    }

    fn skip_attributes(&mut self) -> Result<(), ClassFileError> {
        let count = self.u16()?;
        for _ in 0..count {
            self.u16()?;
            let len = self.u32()? as usize;
            self.bytes(len)?;
        }
        Ok(())
    }

    fn field(&mut self) -> Result<FieldInfo, ClassFileError> {
        let access_flags = self.u16()?;
        let name = self.read_utf8()?;
        let descriptor = self.read_utf8()?;
        let mut constant_value = None;

        let attr_count = self.u16()?;
        for _ in 0..attr_count {
            let attr_name = self.read_utf8()?;
            let len = self.u32()? as usize;
            if attr_name == "ConstantValue" && len == 2 {
                constant_value = Some(self.read_constant_value()?);
            } else {
                self.bytes(len)?;
            }
        }

        Ok(FieldInfo {
            access_flags,
            name,
            descriptor,
            constant_value,
        })
    }

    fn element_value(&mut self, depth: usize) -> Result<ElementValue, ClassFileError> {
        if depth > MAX_ANNOTATION_DEPTH {
            return Err(ClassFileError::TooDeep);
        }
        let tag = self.u8()?;
        Ok(match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
                ElementValue::Const(self.read_constant_value()?)
            }
            b'e' => ElementValue::Enum {
                type_descriptor: self.read_utf8()?,
                const_name: self.read_utf8()?,
            },
            b'c' => ElementValue::Class(self.read_utf8()?),
            b'@' => ElementValue::Annotation(self.annotation(depth + 1)?),
            b'[' => {
                let n = self.u16()?;
                let mut values = Vec::with_capacity(usize::from(n).min(256));
                for _ in 0..n {
                    values.push(self.element_value(depth + 1)?);
                }
                ElementValue::Array(values)
            }
            other => return Err(ClassFileError::BadElementTag(other)),
        })
    }

    fn annotation(&mut self, depth: usize) -> Result<Annotation, ClassFileError> {
        if depth > MAX_ANNOTATION_DEPTH {
            return Err(ClassFileError::TooDeep);
        }
        let type_descriptor = self.read_utf8()?;
        let pairs = self.u16()?;
        let mut elements = Vec::with_capacity(usize::from(pairs).min(64));
        for _ in 0..pairs {
            let name = self.read_utf8()?;
            elements.push((name, self.element_value(depth)?));
        }
        Ok(Annotation {
            type_descriptor,
            elements,
        })
    }

    fn class_file(mut self) -> Result<ClassFile, ClassFileError> {
        let magic = self.u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let _minor = self.u16()?;
        let major_version = self.u16()?;
        self.constant_pool()?;

        let access_flags = self.u16()?;
        let this_class = self.read_class_name()?;
        let super_index = self.u16()?;
        let super_class = if super_index == 0 {
            None
        } else {
            Some(self.class_name(super_index)?)
        };

        let interface_count = self.u16()?;
        let mut interfaces = Vec::with_capacity(usize::from(interface_count).min(256));
        for _ in 0..interface_count {
            interfaces.push(self.read_class_name()?);
        }

        let field_count = self.u16()?;
        let mut fields = Vec::with_capacity(usize::from(field_count).min(1024));
        for _ in 0..field_count {
            fields.push(self.field()?);
        }

        let method_count = self.u16()?;
        for _ in 0..method_count {
            self.bytes(6)?; // access, name, descriptor
            self.skip_attributes()?;
        }

        let mut annotations = Vec::new();
        let attr_count = self.u16()?;
        for _ in 0..attr_count {
            let attr_name = self.read_utf8()?;
            let len = self.u32()? as usize;
            if attr_name == "RuntimeVisibleAnnotations" {
                let end = self.pos.saturating_add(len);
                let n = self.u16()?;
                for _ in 0..n {
                    annotations.push(self.annotation(0)?);
                }
                if self.pos != end {
                    return Err(ClassFileError::Truncated(self.pos));
                }
            } else {
                self.bytes(len)?;
            }
        }

        Ok(ClassFile {
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            annotations,
        })
    }
}

/// 클래스 파일 바이트 생성기 (테스트, 벤치마크용)
#[cfg(any(test, feature = "test-utils"))]
pub mod builder {
    use super::*;

    /// 간단한 클래스 파일을 조립합니다.
    #[derive(Debug, Clone)]
    pub struct ClassBuilder {
        access_flags: u16,
        this_class: String,
        super_class: Option<String>,
        /// (access, name, descriptor, constant)
        fields: Vec<(u16, String, String, Option<ConstantValue>)>,
        /// (type descriptor, elements)
        annotations: Vec<(String, Vec<(String, BuilderValue)>)>,
    }

    /// 생성기에서 지원하는 어노테이션 요소
    #[derive(Debug, Clone)]
    pub enum BuilderValue {
        Int(i32),
        Str(String),
        Enum(String, String),
        StrArray(Vec<String>),
    }

    impl ClassBuilder {
        pub fn new(internal_name: &str) -> Self {
            Self {
                access_flags: ACC_PUBLIC,
                this_class: internal_name.to_owned(),
                super_class: Some("java/lang/Object".to_owned()),
                fields: Vec::new(),
                annotations: Vec::new(),
            }
        }

        pub fn access(mut self, flags: u16) -> Self {
            self.access_flags = flags;
            self
        }

        pub fn super_class(mut self, internal_name: &str) -> Self {
            self.super_class = Some(internal_name.to_owned());
            self
        }

        pub fn no_super(mut self) -> Self {
            self.super_class = None;
            self
        }

        pub fn field(
            mut self,
            access: u16,
            name: &str,
            descriptor: &str,
            constant: Option<ConstantValue>,
        ) -> Self {
            self.fields
                .push((access, name.to_owned(), descriptor.to_owned(), constant));
            self
        }

        pub fn annotation(mut self, descriptor: &str, elements: Vec<(&str, BuilderValue)>) -> Self {
            self.annotations.push((
                descriptor.to_owned(),
                elements
                    .into_iter()
                    .map(|(n, v)| (n.to_owned(), v))
                    .collect(),
            ));
            self
        }

        /// 어노테이션 타입으로 만들고 retention 정책을 붙입니다.
        pub fn annotation_type(self, retention: &str) -> Self {
            self.access(ACC_PUBLIC | ACC_INTERFACE | ACC_ANNOTATION | 0x0400)
                .annotation(
                    RETENTION_DESCRIPTOR,
                    vec![(
                        "value",
                        BuilderValue::Enum(
                            "Ljava/lang/annotation/RetentionPolicy;".to_owned(),
                            retention.to_owned(),
                        ),
                    )],
                )
        }

        /// Kotlin 메타데이터 (`k` = 종류)
        pub fn kotlin_metadata(self, kind: i32) -> Self {
            self.annotation(KOTLIN_METADATA_DESCRIPTOR, vec![("k", BuilderValue::Int(kind))])
        }

        pub fn build(&self) -> Vec<u8> {
            let mut pool = Pool::default();
            let this_idx = pool.class(&self.this_class);
            let super_idx = self.super_class.as_deref().map_or(0, |s| pool.class(s));

            let mut fields = Vec::new();
            fields.extend((self.fields.len() as u16).to_be_bytes());
            for (access, name, desc, constant) in &self.fields {
                fields.extend(access.to_be_bytes());
                fields.extend(pool.utf8(name).to_be_bytes());
                fields.extend(pool.utf8(desc).to_be_bytes());
                match constant {
                    Some(value) => {
                        fields.extend(1u16.to_be_bytes());
                        fields.extend(pool.utf8("ConstantValue").to_be_bytes());
                        fields.extend(2u32.to_be_bytes());
                        fields.extend(pool.constant(value).to_be_bytes());
                    }
                    None => fields.extend(0u16.to_be_bytes()),
                }
            }

            let mut attrs = Vec::new();
            if self.annotations.is_empty() {
                attrs.extend(0u16.to_be_bytes());
            } else {
                let mut body = Vec::new();
                body.extend((self.annotations.len() as u16).to_be_bytes());
                for (desc, elements) in &self.annotations {
                    body.extend(pool.utf8(desc).to_be_bytes());
                    body.extend((elements.len() as u16).to_be_bytes());
                    for (name, value) in elements {
                        body.extend(pool.utf8(name).to_be_bytes());
                        pool.element(value, &mut body);
                    }
                }
                attrs.extend(1u16.to_be_bytes());
                attrs.extend(pool.utf8("RuntimeVisibleAnnotations").to_be_bytes());
                attrs.extend((body.len() as u32).to_be_bytes());
                attrs.extend(body);
            }

            let mut out = Vec::new();
            out.extend(MAGIC.to_be_bytes());
            out.extend(0u16.to_be_bytes());
            out.extend(52u16.to_be_bytes());
            out.extend(pool.count().to_be_bytes());
            out.extend(&pool.bytes);
            out.extend(self.access_flags.to_be_bytes());
            out.extend(this_idx.to_be_bytes());
            out.extend(super_idx.to_be_bytes());
            out.extend(0u16.to_be_bytes()); // interfaces
            out.extend(fields);
            out.extend(0u16.to_be_bytes()); // methods
            out.extend(attrs);
            out
        }
    }

    #[derive(Default)]
    struct Pool {
        bytes: Vec<u8>,
        next: u16,
    }

    impl Pool {
        fn alloc(&mut self, slots: u16) -> u16 {
            if self.next == 0 {
                self.next = 1;
            }
            let idx = self.next;
            self.next += slots;
            idx
        }

        fn count(&self) -> u16 {
            self.next.max(1)
        }

        fn utf8(&mut self, s: &str) -> u16 {
            let idx = self.alloc(1);
            self.bytes.push(1);
            self.bytes.extend((s.len() as u16).to_be_bytes());
            self.bytes.extend(s.as_bytes());
            idx
        }

        fn class(&mut self, name: &str) -> u16 {
            let name_idx = self.utf8(name);
            let idx = self.alloc(1);
            self.bytes.push(7);
            self.bytes.extend(name_idx.to_be_bytes());
            idx
        }

        fn int(&mut self, v: i32) -> u16 {
            let idx = self.alloc(1);
            self.bytes.push(3);
            self.bytes.extend(v.to_be_bytes());
            idx
        }

        fn constant(&mut self, value: &ConstantValue) -> u16 {
            match value {
                ConstantValue::Integer(v) => self.int(*v),
                ConstantValue::Float(v) => {
                    let idx = self.alloc(1);
                    self.bytes.push(4);
                    self.bytes.extend(v.to_bits().to_be_bytes());
                    idx
                }
                ConstantValue::Long(v) => {
                    let idx = self.alloc(2);
                    self.bytes.push(5);
                    self.bytes.extend(v.to_be_bytes());
                    idx
                }
                ConstantValue::Double(v) => {
                    let idx = self.alloc(2);
                    self.bytes.push(6);
                    self.bytes.extend(v.to_bits().to_be_bytes());
                    idx
                }
                ConstantValue::String(s) => {
                    let utf = self.utf8(s);
                    let idx = self.alloc(1);
                    self.bytes.push(8);
                    self.bytes.extend(utf.to_be_bytes());
                    idx
                }
            }
        }

        fn element(&mut self, value: &BuilderValue, out: &mut Vec<u8>) {
            match value {
                BuilderValue::Int(v) => {
                    out.push(b'I');
                    out.extend(self.int(*v).to_be_bytes());
                }
                BuilderValue::Str(s) => {
                    out.push(b's');
                    out.extend(self.utf8(s).to_be_bytes());
                }
                BuilderValue::Enum(ty, name) => {
                    out.push(b'e');
                    out.extend(self.utf8(ty).to_be_bytes());
                    out.extend(self.utf8(name).to_be_bytes());
                }
                BuilderValue::StrArray(items) => {
                    out.push(b'[');
                    out.extend((items.len() as u16).to_be_bytes());
                    for s in items {
                        out.push(b's');
                        out.extend(self.utf8(s).to_be_bytes());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::builder::{BuilderValue, ClassBuilder};
    use super::*;

    #[test]
    fn parses_minimal_class() {
        let bytes = ClassBuilder::new("com/example/Foo").build();
        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.this_class, "com/example/Foo");
        assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
        assert_eq!(class.major_version, 52);
        assert!(class.fields.is_empty());
        assert!(!class.is_annotation());
    }

    #[test]
    fn reads_constant_fields() {
        let bytes = ClassBuilder::new("com/example/Consts")
            .field(
                ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
                "MAX",
                "I",
                Some(ConstantValue::Integer(42)),
            )
            .field(
                ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
                "BIG",
                "J",
                Some(ConstantValue::Long(1 << 40)),
            )
            .field(
                ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
                "NAME",
                "Ljava/lang/String;",
                Some(ConstantValue::String("x".to_owned())),
            )
            .field(ACC_PUBLIC, "mutable", "I", None)
            .build();
        let class = ClassFile::parse(&bytes).unwrap();

        let constants: Vec<&str> = class
            .fields
            .iter()
            .filter(|f| f.is_constant())
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(constants, vec!["MAX", "BIG", "NAME"]);
        assert_eq!(
            class.fields[1].constant_value,
            Some(ConstantValue::Long(1 << 40))
        );
    }

    #[test]
    fn reads_retention() {
        let source = ClassBuilder::new("a/Gen").annotation_type("SOURCE").build();
        let runtime = ClassBuilder::new("a/Keep").annotation_type("RUNTIME").build();
        let plain = ClassBuilder::new("a/Plain").build();

        let source = ClassFile::parse(&source).unwrap();
        assert!(source.is_annotation());
        assert_eq!(source.retention(), "SOURCE");
        assert_eq!(ClassFile::parse(&runtime).unwrap().retention(), "RUNTIME");
        assert_eq!(ClassFile::parse(&plain).unwrap().retention(), "CLASS");
    }

    #[test]
    fn reads_kotlin_kind() {
        let facade = ClassBuilder::new("a/UtilsKt").kotlin_metadata(2).build();
        let class = ClassFile::parse(&facade).unwrap();
        assert_eq!(class.kotlin_kind(), Some(2));
        assert_eq!(
            ClassFile::parse(&ClassBuilder::new("a/B").build())
                .unwrap()
                .kotlin_kind(),
            None
        );
    }

    #[test]
    fn reads_string_array_elements() {
        let bytes = ClassBuilder::new("a/Proc")
            .annotation(
                "Ljavax/annotation/processing/SupportedAnnotationTypes;",
                vec![(
                    "value",
                    BuilderValue::StrArray(vec!["a.Gen".to_owned(), "a.Other".to_owned()]),
                )],
            )
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        let ann = class
            .annotation("Ljavax/annotation/processing/SupportedAnnotationTypes;")
            .unwrap();
        match ann.element("value") {
            Some(ElementValue::Array(values)) => assert_eq!(values.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_magic() {
        assert_eq!(
            ClassFile::parse(&[0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 52]),
            Err(ClassFileError::BadMagic(0xdead_beef))
        );
    }

    #[test]
    fn truncated_input_is_an_error_not_a_panic() {
        let bytes = ClassBuilder::new("com/example/Foo")
            .kotlin_metadata(1)
            .build();
        for len in 0..bytes.len() {
            assert!(ClassFile::parse(&bytes[..len]).is_err(), "len {len}");
        }
    }

    #[test]
    fn unknown_pool_tag() {
        let mut bytes = MAGIC.to_be_bytes().to_vec();
        bytes.extend([0, 0, 0, 52, 0, 2, 99]);
        assert_eq!(
            ClassFile::parse(&bytes),
            Err(ClassFileError::UnknownTag { tag: 99, index: 1 })
        );
    }
}
