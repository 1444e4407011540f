//! Error taxonomy shared by the resolver and container implementations

use thiserror::Error;

/// Errors raised while resolving values or realizing beans
#[derive(Debug, Error)]
pub enum BeansError {
    #[error("No bean named '{name}' available")]
    NoSuchBean { name: String },

    #[error("No qualifying bean of type '{type_name}' available")]
    NoSuchBeanOfType { type_name: String },

    #[error("No unique bean of type '{type_name}': expected single matching bean but found {}: {}", .candidates.len(), .candidates.join(","))]
    NoUniqueBean {
        type_name: String,
        candidates: Vec<String>,
    },

    #[error("Bean named '{name}' is expected to be of type '{required_type}' but was actually of type '{actual_type}'")]
    BeanNotOfRequiredType {
        name: String,
        required_type: String,
        actual_type: String,
    },

    /// Invalid definition content, e.g. a bean name reference to an unknown bean
    #[error("Invalid bean definition{}{}: {message}", describe_bean(.bean_name), describe_resource(.resource_description))]
    BeanDefinitionStore {
        resource_description: Option<String>,
        bean_name: Option<String>,
        message: String,
    },

    /// Failure while creating a bean, carrying the underlying cause
    #[error("Error creating bean{}{}: {message}", describe_bean(.bean_name), describe_resource(.resource_description))]
    BeanCreation {
        resource_description: Option<String>,
        bean_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<BeansError>>,
    },

    #[error("Error creating bean with name '{name}': Requested bean is currently in creation: Is there an unresolvable circular reference?")]
    CurrentlyInCreation { name: String },

    #[error("Failed to convert value '{value}' to required type '{required_type}': {message}")]
    TypeMismatch {
        value: String,
        required_type: String,
        message: String,
    },

    #[error("Cannot resolve type '{type_name}'")]
    TypeNotFound { type_name: String },

    #[error("Failed to evaluate '{expression}': {message}")]
    Evaluation { expression: String, message: String },
}

/// Result alias used throughout beanwire
pub type BeansResult<T> = Result<T, BeansError>;

fn describe_bean(bean_name: &Option<String>) -> String {
    match bean_name {
        Some(name) => format!(" with name '{}'", name),
        None => String::new(),
    }
}

fn describe_resource(resource: &Option<String>) -> String {
    match resource {
        Some(resource) => format!(" defined in {}", resource),
        None => String::new(),
    }
}

impl BeansError {
    /// Build a creation error wrapping `cause`
    pub fn creation(
        resource_description: Option<&str>,
        bean_name: &str,
        message: impl Into<String>,
        cause: BeansError,
    ) -> Self {
        BeansError::BeanCreation {
            resource_description: resource_description.map(str::to_string),
            bean_name: Some(bean_name.to_string()),
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Build a creation error that has no underlying cause
    pub fn creation_without_cause(
        resource_description: Option<&str>,
        bean_name: &str,
        message: impl Into<String>,
    ) -> Self {
        BeansError::BeanCreation {
            resource_description: resource_description.map(str::to_string),
            bean_name: Some(bean_name.to_string()),
            message: message.into(),
            source: None,
        }
    }

    /// Whether this is a bean creation error
    pub fn is_creation(&self) -> bool {
        matches!(self, BeansError::BeanCreation { .. })
    }

    /// Whether this is an invalid-definition error
    pub fn is_definition_store(&self) -> bool {
        matches!(self, BeansError::BeanDefinitionStore { .. })
    }

    /// Message of a creation or store error, if this is one
    pub fn message(&self) -> Option<&str> {
        match self {
            BeansError::BeanCreation { message, .. } | BeansError::BeanDefinitionStore { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// Walk wrapped creation errors down to the innermost cause
    pub fn root_cause(&self) -> &BeansError {
        let mut current = self;
        while let BeansError::BeanCreation {
            source: Some(cause),
            ..
        } = current
        {
            current = cause;
        }
        current
    }
}
